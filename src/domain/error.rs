//! Error types for the prompt store.
//!
//! Repository functions never swallow failures; they surface one of these
//! variants and leave recovery to the caller.

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Folder,
    Prompt,
    PromptVersion,
    Tag,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Folder => write!(f, "folder"),
            Self::Prompt => write!(f, "prompt"),
            Self::PromptVersion => write!(f, "prompt version"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or initialized.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A multi-step write failed and was rolled back.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// A write would leave a dangling or cyclic reference.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Only aborted transactions are worth retrying; everything else will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionAborted(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::TransactionAborted(_) => "transaction_aborted",
            Self::InvalidReference(_) => "invalid_reference",
            Self::Sqlite(_) => "database",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found(EntityKind::Folder, "f-1");
        assert_eq!(err.to_string(), "folder not found: f-1");

        let err = StoreError::TransactionAborted("disk I/O error".into());
        assert_eq!(err.to_string(), "Transaction aborted: disk I/O error");
    }

    #[test]
    fn test_only_aborted_transactions_are_retryable() {
        assert!(StoreError::TransactionAborted("x".into()).is_retryable());
        assert!(!StoreError::StorageUnavailable("x".into()).is_retryable());
        let missing = StoreError::not_found(EntityKind::Prompt, "p");
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StoreError::InvalidReference("cycle".into()).category(),
            "invalid_reference"
        );
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.category(), "database");
    }
}
