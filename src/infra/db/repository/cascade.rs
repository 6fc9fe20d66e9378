//! Transactional removal of a project and everything it owns.

use super::{ids_where, with_transaction};
use crate::domain::StoreResult;
use rusqlite::Connection;

/// Rows removed by a cascading delete, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub projects: usize,
    pub folders: usize,
    pub prompts: usize,
    pub versions: usize,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.projects == 0 && self.folders == 0 && self.prompts == 0 && self.versions == 0
    }
}

/// Delete a project, its folders, its prompts and every version of those prompts.
///
/// All deletes share one transaction: either everything goes or nothing does.
/// An unknown project id yields an empty report.
pub(super) fn delete_project(
    conn: &mut Connection,
    project_id: &str,
) -> StoreResult<CascadeReport> {
    let report = with_transaction(conn, "project cascade delete", |tx| {
        let mut report = CascadeReport {
            projects: tx.execute("DELETE FROM projects WHERE id = ?1", [project_id])?,
            ..CascadeReport::default()
        };

        let folder_ids = ids_where(tx, "SELECT id FROM folders WHERE project_id = ?1", project_id)?;
        for folder_id in &folder_ids {
            report.folders += tx.execute("DELETE FROM folders WHERE id = ?1", [folder_id])?;
        }

        let prompt_ids = ids_where(tx, "SELECT id FROM prompts WHERE project_id = ?1", project_id)?;
        for prompt_id in &prompt_ids {
            let (prompts, versions) = remove_prompt(tx, prompt_id)?;
            report.prompts += prompts;
            report.versions += versions;
        }

        Ok(report)
    })?;

    if !report.is_empty() {
        log::debug!(
            "Deleted project {}: {} folder(s), {} prompt(s), {} version(s)",
            project_id,
            report.folders,
            report.prompts,
            report.versions
        );
    }
    Ok(report)
}

/// Delete one prompt row and its versions. The caller owns the transaction.
pub(super) fn remove_prompt(
    conn: &Connection,
    prompt_id: &str,
) -> rusqlite::Result<(usize, usize)> {
    let prompts = conn.execute("DELETE FROM prompts WHERE id = ?1", [prompt_id])?;

    let version_ids = ids_where(
        conn,
        "SELECT id FROM prompt_versions WHERE prompt_id = ?1",
        prompt_id,
    )?;
    let mut versions = 0;
    for version_id in &version_ids {
        versions += conn.execute("DELETE FROM prompt_versions WHERE id = ?1", [version_id])?;
    }

    Ok((prompts, versions))
}
