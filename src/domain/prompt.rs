use super::folder::FolderId;
use super::project::ProjectId;
use super::tag::TagId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a prompt
pub type PromptId = String;

/// Unique identifier for a prompt version
pub type VersionId = String;

/// Model a prompt version is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelKind {
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "claude-3")]
    Claude3,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini25Flash => write!(f, "gemini-2.5-flash"),
            Self::Gpt4 => write!(f, "gpt-4"),
            Self::Claude3 => write!(f, "claude-3"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini-2.5-flash" | "gemini" => Ok(Self::Gemini25Flash),
            "gpt-4" | "gpt4" => Ok(Self::Gpt4),
            "claude-3" | "claude" => Ok(Self::Claude3),
            other => Err(format!("unknown model: {other}")),
        }
    }
}

/// Generation settings stored with each version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: ModelKind,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: ModelKind::Gemini25Flash,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// One immutable snapshot of a prompt's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    pub id: VersionId,
    pub prompt_id: PromptId,
    /// Starts at 1 and grows by one per appended version.
    pub version_number: u32,
    pub content: String,
    pub model_settings: ModelSettings,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}

/// A prompt and its version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub title: String,
    /// Tag ids. Ids of deleted tags are kept.
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Creation timestamp in RFC3339 format; empty for a prompt that was never saved.
    #[serde(default)]
    pub created_at: String,
    pub current_version_id: VersionId,
    /// Ordered by `version_number`.
    #[serde(default)]
    pub versions: Vec<PromptVersion>,
}

impl Prompt {
    pub fn current_version(&self) -> Option<&PromptVersion> {
        let current = &self.current_version_id;
        self.versions.iter().find(|v| &v.id == current)
    }

    pub fn latest_version_number(&self) -> u32 {
        self.versions
            .iter()
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
    }

    /// A prompt counts as stored once it carries a creation timestamp.
    pub fn is_persisted(&self) -> bool {
        !self.created_at.is_empty()
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }

    /// True when `current_version_id` points at one of this prompt's own versions.
    pub fn current_version_is_consistent(&self) -> bool {
        self.current_version()
            .is_some_and(|v| v.prompt_id == self.id)
    }
}

/// Fields required to create a prompt; the first version is built from `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrompt {
    pub project_id: ProjectId,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub is_favorite: bool,
    pub content: String,
}

impl NewPrompt {
    pub fn new(
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            folder_id: None,
            title: title.into(),
            tags: Vec::new(),
            is_favorite: false,
            content: content.into(),
        }
    }

    pub fn in_folder(mut self, folder_id: impl Into<FolderId>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self
    }
}
