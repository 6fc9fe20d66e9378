use super::{DbConn, json_column};
use crate::domain::{PromptVersion, StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension, Row};

const VERSION_COLUMNS: &str =
    "id, prompt_id, version_number, content, model_settings, created_at";

/// Read access to prompt versions. Versions are written only through
/// [`super::PromptRepository`] and removed only with their prompt.
pub struct PromptVersionRepository {
    conn: DbConn,
}

impl PromptVersionRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// Versions of one prompt, oldest first.
    pub fn list_by_prompt(&self, prompt_id: &str) -> StoreResult<Vec<PromptVersion>> {
        let conn = self.conn.lock();
        list_for_prompt(&conn, prompt_id).map_err(Into::into)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<PromptVersion>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {VERSION_COLUMNS} FROM prompt_versions WHERE id = ?1"),
            [id],
            row_to_version,
        )
        .optional()
        .map_err(Into::into)
    }
}

pub(super) fn list_for_prompt(
    conn: &Connection,
    prompt_id: &str,
) -> rusqlite::Result<Vec<PromptVersion>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {VERSION_COLUMNS} FROM prompt_versions WHERE prompt_id = ?1 ORDER BY version_number"
    ))?;
    let rows = stmt.query_map([prompt_id], row_to_version)?;
    rows.collect()
}

/// Insert a version, or overwrite the stored one with the same id.
///
/// A stored version never changes owner: an id already held by another
/// prompt is rejected with `InvalidReference`.
pub(super) fn upsert(conn: &Connection, version: &PromptVersion) -> StoreResult<()> {
    let settings_json = serde_json::to_string(&version.model_settings)?;
    let changed = conn.execute(
        r#"
        INSERT INTO prompt_versions
            (id, prompt_id, version_number, content, model_settings, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            version_number = excluded.version_number,
            content = excluded.content,
            model_settings = excluded.model_settings,
            created_at = excluded.created_at
        WHERE prompt_versions.prompt_id = excluded.prompt_id
        "#,
        rusqlite::params![
            version.id,
            version.prompt_id,
            version.version_number,
            version.content,
            settings_json,
            version.created_at
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::InvalidReference(format!(
            "version {} belongs to another prompt, not {}",
            version.id, version.prompt_id
        )));
    }
    Ok(())
}

/// Delete the stored versions of a prompt whose ids are not in `keep`.
pub(super) fn prune(conn: &Connection, prompt_id: &str, keep: &[&str]) -> rusqlite::Result<usize> {
    let stored = super::ids_where(
        conn,
        "SELECT id FROM prompt_versions WHERE prompt_id = ?1",
        prompt_id,
    )?;
    let mut removed = 0;
    for id in stored.iter().filter(|id| !keep.contains(&id.as_str())) {
        removed += conn.execute("DELETE FROM prompt_versions WHERE id = ?1", [id])?;
    }
    Ok(removed)
}

pub(super) fn next_version_number(conn: &Connection, prompt_id: &str) -> rusqlite::Result<u32> {
    let latest: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version_number), 0) FROM prompt_versions WHERE prompt_id = ?1",
        [prompt_id],
        |row| row.get(0),
    )?;
    Ok(latest + 1)
}

fn row_to_version(row: &Row) -> rusqlite::Result<PromptVersion> {
    Ok(PromptVersion {
        id: row.get(0)?,
        prompt_id: row.get(1)?,
        version_number: row.get(2)?,
        content: row.get(3)?,
        model_settings: json_column(row, 4)?,
        created_at: row.get(5)?,
    })
}
