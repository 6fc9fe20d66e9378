use serde::{Deserialize, Serialize};

/// Unique identifier for a project
pub type ProjectId = String;

/// Top-level container for folders and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// Color tag used by the UI (for example `bg-blue-500`).
    pub color: String,
}

/// Fields required to create a project; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color: color.into(),
        }
    }

    /// The project materialized when the library starts out empty.
    pub fn default_project() -> Self {
        Self::new("My First Project", "A default project", "bg-blue-500")
    }
}
