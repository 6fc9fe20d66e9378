use super::project::ProjectId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a folder
pub type FolderId = String;

/// A folder inside a project. Folders nest through `parent_folder_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub project_id: ProjectId,
    pub name: String,
    /// Parent folder in the same project, `None` for a top-level folder.
    #[serde(default)]
    pub parent_folder_id: Option<FolderId>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Fields required to create a folder. New folders start top-level and not favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFolder {
    pub project_id: ProjectId,
    pub name: String,
}

impl NewFolder {
    pub fn new(project_id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
        }
    }
}
