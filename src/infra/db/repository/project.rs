use super::cascade::{self, CascadeReport};
use super::{DbConn, new_id};
use crate::domain::{NewProject, Project, StoreResult};
use rusqlite::Row;

/// Repository for project operations.
pub struct ProjectRepository {
    conn: DbConn,
}

impl ProjectRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// All projects in insertion order.
    pub fn list(&self) -> StoreResult<Vec<Project>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, description, color FROM projects ORDER BY rowid")?;
        let rows = stmt.query_map([], Self::row_to_project)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Project>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name, description, color FROM projects WHERE id = ?1")?;
        let mut rows = stmt.query_map([id], Self::row_to_project)?;
        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    pub fn create(&self, project: &NewProject) -> StoreResult<Project> {
        let conn = self.conn.lock();
        let created = Project {
            id: new_id(),
            name: project.name.clone(),
            description: project.description.clone(),
            color: project.color.clone(),
        };
        conn.execute(
            "INSERT INTO projects (id, name, description, color) VALUES (?1, ?2, ?3, ?4)",
            (&created.id, &created.name, &created.description, &created.color),
        )?;
        log::debug!("Created project {} ({})", created.id, created.name);
        Ok(created)
    }

    /// Full-record replace keyed by id. Inserts the record if the id is unknown.
    pub fn update(&self, project: &Project) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO projects (id, name, description, color) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                color = excluded.color
            "#,
            (&project.id, &project.name, &project.description, &project.color),
        )?;
        Ok(())
    }

    /// Delete the project together with its folders, prompts and prompt versions.
    /// Deleting an unknown id is a no-op.
    pub fn delete(&self, id: &str) -> StoreResult<CascadeReport> {
        let mut conn = self.conn.lock();
        cascade::delete_project(&mut conn, id)
    }

    fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            color: row.get(3)?,
        })
    }
}
