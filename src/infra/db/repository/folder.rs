use super::{DbConn, exists, new_id, with_transaction};
use crate::domain::{EntityKind, Folder, NewFolder, StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::HashSet;

const FOLDER_COLUMNS: &str = "id, project_id, name, parent_folder_id, is_favorite";

/// Repository for folder operations.
pub struct FolderRepository {
    conn: DbConn,
}

impl FolderRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn list_all(&self) -> StoreResult<Vec<Folder>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare(&format!("SELECT {FOLDER_COLUMNS} FROM folders ORDER BY rowid"))?;
        let rows = stmt.query_map([], Self::row_to_folder)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_by_project(&self, project_id: &str) -> StoreResult<Vec<Folder>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE project_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([project_id], Self::row_to_folder)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Direct children of `parent_id`.
    pub fn list_children(&self, parent_id: &str) -> StoreResult<Vec<Folder>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE parent_folder_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map([parent_id], Self::row_to_folder)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Folder>> {
        let conn = self.conn.lock();
        Self::load(&conn, id).map_err(Into::into)
    }

    /// Create a top-level, non-favorite folder under an existing project.
    pub fn create(&self, folder: &NewFolder) -> StoreResult<Folder> {
        let conn = self.conn.lock();
        if !exists(&conn, "projects", &folder.project_id)? {
            return Err(StoreError::InvalidReference(format!(
                "folder references missing project {}",
                folder.project_id
            )));
        }

        let created = Folder {
            id: new_id(),
            project_id: folder.project_id.clone(),
            name: folder.name.clone(),
            parent_folder_id: None,
            is_favorite: false,
        };
        conn.execute(
            "INSERT INTO folders (id, project_id, name, parent_folder_id, is_favorite) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                created.id,
                created.project_id,
                created.name,
                created.parent_folder_id,
                created.is_favorite
            ],
        )?;
        Ok(created)
    }

    /// Full-record replace keyed by id. References are not checked; use
    /// [`FolderRepository::move_to`] for validated re-parenting.
    pub fn update(&self, folder: &Folder) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO folders (id, project_id, name, parent_folder_id, is_favorite)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                name = excluded.name,
                parent_folder_id = excluded.parent_folder_id,
                is_favorite = excluded.is_favorite
            "#,
            rusqlite::params![
                folder.id,
                folder.project_id,
                folder.name,
                folder.parent_folder_id,
                folder.is_favorite
            ],
        )?;
        Ok(())
    }

    /// Re-parent a folder. `None` moves it to the top level of its project.
    ///
    /// The new parent must exist, live in the same project, and must not be
    /// the folder itself or one of its descendants.
    pub fn move_to(&self, folder_id: &str, new_parent: Option<&str>) -> StoreResult<Folder> {
        let conn = self.conn.lock();
        let mut folder = Self::load(&conn, folder_id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Folder, folder_id))?;

        if let Some(parent_id) = new_parent {
            Self::check_parent(&conn, &folder, parent_id)?;
        }

        folder.parent_folder_id = new_parent.map(str::to_string);
        conn.execute(
            "UPDATE folders SET parent_folder_id = ?2 WHERE id = ?1",
            rusqlite::params![folder.id, folder.parent_folder_id],
        )?;
        Ok(folder)
    }

    /// Delete a folder without deleting its contents.
    ///
    /// Child folders move up to the deleted folder's parent and prompts filed
    /// in it fall back to the project root, all in one transaction.
    pub fn delete(&self, id: &str) -> StoreResult<usize> {
        let mut conn = self.conn.lock();
        with_transaction(&mut conn, "folder delete", |tx| {
            let Some(folder) = Self::load(tx, id)? else {
                return Ok(0);
            };

            let reparented = tx.execute(
                "UPDATE folders SET parent_folder_id = ?2 WHERE parent_folder_id = ?1",
                rusqlite::params![folder.id, folder.parent_folder_id],
            )?;
            let unfiled = tx.execute(
                "UPDATE prompts SET folder_id = NULL WHERE folder_id = ?1",
                [&folder.id],
            )?;
            let deleted = tx.execute("DELETE FROM folders WHERE id = ?1", [&folder.id])?;

            if reparented > 0 || unfiled > 0 {
                log::debug!(
                    "Deleted folder {}: moved {} subfolder(s), unfiled {} prompt(s)",
                    folder.id,
                    reparented,
                    unfiled
                );
            }
            Ok(deleted)
        })
    }

    fn check_parent(conn: &Connection, folder: &Folder, parent_id: &str) -> StoreResult<()> {
        if parent_id == folder.id {
            return Err(StoreError::InvalidReference(format!(
                "folder {} cannot be its own parent",
                folder.id
            )));
        }

        let parent = Self::load(conn, parent_id)?.ok_or_else(|| {
            StoreError::InvalidReference(format!("parent folder {} does not exist", parent_id))
        })?;
        if parent.project_id != folder.project_id {
            return Err(StoreError::InvalidReference(format!(
                "parent folder {} belongs to project {}, not {}",
                parent_id, parent.project_id, folder.project_id
            )));
        }

        // Walk up from the new parent; meeting the folder means it would become its own ancestor.
        let mut seen = HashSet::new();
        let mut cursor = parent.parent_folder_id;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == folder.id {
                return Err(StoreError::InvalidReference(format!(
                    "moving folder {} under {} would create a cycle",
                    folder.id, parent_id
                )));
            }
            if !seen.insert(ancestor_id.clone()) {
                break;
            }
            cursor = Self::load(conn, &ancestor_id)?.and_then(|f| f.parent_folder_id);
        }
        Ok(())
    }

    fn load(conn: &Connection, id: &str) -> rusqlite::Result<Option<Folder>> {
        conn.query_row(
            &format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = ?1"),
            [id],
            Self::row_to_folder,
        )
        .optional()
    }

    fn row_to_folder(row: &Row) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            parent_folder_id: row.get(3)?,
            is_favorite: row.get(4)?,
        })
    }
}
