//! Repository implementations for data access in Promptvault.
//!
//! Provides database operations for projects, folders, prompts, prompt versions and tags.

mod cascade;
mod folder;
mod project;
mod prompt;
mod prompt_version;
mod tag;

pub use cascade::CascadeReport;
pub use folder::FolderRepository;
pub use project::ProjectRepository;
pub use prompt::PromptRepository;
pub use prompt_version::PromptVersionRepository;
pub use tag::TagRepository;

use crate::domain::{StoreError, StoreResult};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub type DbConn = Arc<Mutex<Connection>>;

/// Runs `f` inside one immediate transaction.
///
/// The transaction commits only if `f` succeeds; otherwise it is dropped,
/// which rolls back every statement `f` executed. SQLite failures surface as
/// `TransactionAborted`, domain errors raised by `f` pass through unchanged.
pub(super) fn with_transaction<T>(
    conn: &mut Connection,
    what: &str,
    f: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
) -> StoreResult<T> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| StoreError::TransactionAborted(format!("{}: {}", what, e)))?;

    match f(&tx) {
        Ok(value) => {
            tx.commit()
                .map_err(|e| StoreError::TransactionAborted(format!("{}: {}", what, e)))?;
            Ok(value)
        }
        Err(err) => {
            drop(tx);
            log::warn!("{} rolled back: {}", what, err);
            Err(match err {
                StoreError::Sqlite(e) => StoreError::TransactionAborted(format!("{}: {}", what, e)),
                other => other,
            })
        }
    }
}

/// Decode a JSON TEXT column.
pub(super) fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Collect the first column of a single-parameter query as ids.
pub(super) fn ids_where(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;
    rows.collect()
}

pub(super) fn exists(conn: &Connection, table: &str, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table),
        [id],
        |row| row.get(0),
    )
}

pub(super) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub(super) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
