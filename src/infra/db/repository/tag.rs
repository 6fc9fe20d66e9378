use super::{DbConn, new_id};
use crate::domain::{NewTag, StoreResult, Tag};
use rusqlite::{OptionalExtension, Row};

pub struct TagRepository {
    conn: DbConn,
}

impl TagRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn list_all(&self) -> StoreResult<Vec<Tag>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name, color FROM tags ORDER BY rowid")?;
        let rows = stmt.query_map([], Self::row_to_tag)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Tag>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, color FROM tags WHERE id = ?1",
            [id],
            Self::row_to_tag,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn create(&self, tag: &NewTag) -> StoreResult<Tag> {
        let conn = self.conn.lock();
        let created = Tag {
            id: new_id(),
            name: tag.name.clone(),
            color: tag.color.clone(),
        };
        conn.execute(
            "INSERT INTO tags (id, name, color) VALUES (?1, ?2, ?3)",
            (&created.id, &created.name, &created.color),
        )?;
        Ok(created)
    }

    pub fn update(&self, tag: &Tag) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO tags (id, name, color) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color
            "#,
            (&tag.id, &tag.name, &tag.color),
        )?;
        Ok(())
    }

    /// Prompts keep the id of a deleted tag; readers treat it as an unknown label.
    pub fn delete(&self, id: &str) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        Ok(affected)
    }

    fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    }
}
