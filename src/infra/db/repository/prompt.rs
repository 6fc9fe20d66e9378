use super::cascade::remove_prompt;
use super::prompt_version::{self, list_for_prompt, next_version_number};
use super::{DbConn, exists, json_column, new_id, now_rfc3339, with_transaction};
use crate::domain::{
    EntityKind, ModelSettings, NewPrompt, Prompt, PromptVersion, StoreError, StoreResult,
};
use rusqlite::{Connection, OptionalExtension, Row};

const PROMPT_COLUMNS: &str =
    "id, project_id, folder_id, title, tags, is_favorite, created_at, current_version_id";

/// Repository for prompt operations. Every prompt read carries its versions.
pub struct PromptRepository {
    conn: DbConn,
    default_settings: ModelSettings,
}

impl PromptRepository {
    pub fn new(conn: DbConn) -> Self {
        Self {
            conn,
            default_settings: ModelSettings::default(),
        }
    }

    /// Settings used for the first version of prompts created through this repository.
    pub fn with_default_settings(mut self, settings: ModelSettings) -> Self {
        self.default_settings = settings;
        self
    }

    pub fn list_all(&self) -> StoreResult<Vec<Prompt>> {
        let conn = self.conn.lock();
        Self::query_prompts(
            &conn,
            &format!("SELECT {PROMPT_COLUMNS} FROM prompts ORDER BY rowid"),
            None,
        )
    }

    pub fn list_by_project(&self, project_id: &str) -> StoreResult<Vec<Prompt>> {
        let conn = self.conn.lock();
        Self::query_prompts(
            &conn,
            &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE project_id = ?1 ORDER BY rowid"),
            Some(project_id),
        )
    }

    pub fn list_by_folder(&self, folder_id: &str) -> StoreResult<Vec<Prompt>> {
        let conn = self.conn.lock();
        Self::query_prompts(
            &conn,
            &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE folder_id = ?1 ORDER BY rowid"),
            Some(folder_id),
        )
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Prompt>> {
        let conn = self.conn.lock();
        Self::load(&conn, id)
    }

    /// Create a prompt together with its first version.
    ///
    /// Version 1 holds `prompt.content` and the repository's default model
    /// settings. Both rows are written in one transaction.
    pub fn create(&self, prompt: &NewPrompt) -> StoreResult<Prompt> {
        let mut conn = self.conn.lock();
        Self::check_placement(&conn, &prompt.project_id, prompt.folder_id.as_deref())?;

        let now = now_rfc3339();
        let prompt_id = new_id();
        let version = PromptVersion {
            id: new_id(),
            prompt_id: prompt_id.clone(),
            version_number: 1,
            content: prompt.content.clone(),
            model_settings: self.default_settings,
            created_at: now.clone(),
        };
        let created = Prompt {
            id: prompt_id,
            project_id: prompt.project_id.clone(),
            folder_id: prompt.folder_id.clone(),
            title: prompt.title.clone(),
            tags: prompt.tags.clone(),
            is_favorite: prompt.is_favorite,
            created_at: now,
            current_version_id: version.id.clone(),
            versions: vec![version],
        };

        with_transaction(&mut conn, "prompt create", |tx| {
            Self::write_row(tx, &created, false)?;
            prompt_version::upsert(tx, &created.versions[0])
        })?;

        log::debug!("Created prompt {} ({})", created.id, created.title);
        Ok(created)
    }

    /// Full-record replace of the prompt row and the versions it carries.
    ///
    /// Stored versions missing from `versions` are deleted. A version id that
    /// belongs to another prompt fails the whole update with
    /// `InvalidReference`. `current_version_id` is not validated; a prompt
    /// whose current version is missing from `versions` is stored as given.
    pub fn update(&self, prompt: &Prompt) -> StoreResult<()> {
        if !prompt.current_version_is_consistent() {
            log::warn!(
                "Prompt {} saved with current version {} outside its versions",
                prompt.id,
                prompt.current_version_id
            );
        }

        let mut conn = self.conn.lock();
        with_transaction(&mut conn, "prompt update", |tx| {
            Self::write_row(tx, prompt, true)?;
            let keep: Vec<&str> = prompt.versions.iter().map(|v| v.id.as_str()).collect();
            let pruned = prompt_version::prune(tx, &prompt.id, &keep)?;
            if pruned > 0 {
                log::debug!("Prompt {} dropped {} version(s)", prompt.id, pruned);
            }
            for version in &prompt.versions {
                prompt_version::upsert(tx, version)?;
            }
            Ok(())
        })
    }

    /// Persist a prompt coming out of an editor.
    ///
    /// A prompt without `created_at` has never been stored and is created
    /// from its first version's content; anything else is updated in place.
    pub fn save(&self, prompt: &Prompt) -> StoreResult<Prompt> {
        if prompt.is_persisted() {
            self.update(prompt)?;
            return Ok(prompt.clone());
        }

        let content = prompt
            .versions
            .first()
            .map(|v| v.content.clone())
            .unwrap_or_default();
        self.create(&NewPrompt {
            project_id: prompt.project_id.clone(),
            folder_id: prompt.folder_id.clone(),
            title: prompt.title.clone(),
            tags: prompt.tags.clone(),
            is_favorite: prompt.is_favorite,
            content,
        })
    }

    /// Append a version and make it current.
    ///
    /// The new version number is one past the highest stored for the prompt.
    /// Without explicit settings the current version's settings are carried over.
    pub fn add_version(
        &self,
        prompt_id: &str,
        content: &str,
        settings: Option<ModelSettings>,
    ) -> StoreResult<Prompt> {
        let mut conn = self.conn.lock();
        let default_settings = self.default_settings;
        with_transaction(&mut conn, "prompt add version", |tx| {
            let prompt = Self::load(tx, prompt_id)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Prompt, prompt_id))?;

            let model_settings = settings
                .or_else(|| prompt.current_version().map(|v| v.model_settings))
                .unwrap_or(default_settings);
            let version = PromptVersion {
                id: new_id(),
                prompt_id: prompt.id.clone(),
                version_number: next_version_number(tx, &prompt.id)?,
                content: content.to_string(),
                model_settings,
                created_at: now_rfc3339(),
            };
            prompt_version::upsert(tx, &version)?;
            tx.execute(
                "UPDATE prompts SET current_version_id = ?2 WHERE id = ?1",
                (&prompt.id, &version.id),
            )?;

            log::debug!(
                "Prompt {} advanced to version {}",
                prompt.id,
                version.version_number
            );
            Self::load(tx, &prompt.id)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Prompt, prompt_id))
        })
    }

    /// Delete a prompt and all of its versions. Unknown ids are a no-op.
    pub fn delete(&self, id: &str) -> StoreResult<usize> {
        let mut conn = self.conn.lock();
        with_transaction(&mut conn, "prompt delete", |tx| {
            let (prompts, _versions) = remove_prompt(tx, id)?;
            Ok(prompts)
        })
    }

    fn check_placement(
        conn: &Connection,
        project_id: &str,
        folder_id: Option<&str>,
    ) -> StoreResult<()> {
        if !exists(conn, "projects", project_id)? {
            return Err(StoreError::InvalidReference(format!(
                "prompt references missing project {}",
                project_id
            )));
        }

        if let Some(folder_id) = folder_id {
            let folder_project: Option<String> = conn
                .query_row(
                    "SELECT project_id FROM folders WHERE id = ?1",
                    [folder_id],
                    |row| row.get(0),
                )
                .optional()?;
            match folder_project {
                None => {
                    return Err(StoreError::InvalidReference(format!(
                        "prompt references missing folder {}",
                        folder_id
                    )));
                }
                Some(owner) if owner != project_id => {
                    return Err(StoreError::InvalidReference(format!(
                        "folder {} belongs to project {}, not {}",
                        folder_id, owner, project_id
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn write_row(conn: &Connection, prompt: &Prompt, replace: bool) -> StoreResult<()> {
        let tags_json = serde_json::to_string(&prompt.tags)?;
        let sql = if replace {
            r#"
            INSERT INTO prompts
                (id, project_id, folder_id, title, tags, is_favorite, created_at, current_version_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                project_id = excluded.project_id,
                folder_id = excluded.folder_id,
                title = excluded.title,
                tags = excluded.tags,
                is_favorite = excluded.is_favorite,
                created_at = excluded.created_at,
                current_version_id = excluded.current_version_id
            "#
        } else {
            r#"
            INSERT INTO prompts
                (id, project_id, folder_id, title, tags, is_favorite, created_at, current_version_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#
        };
        conn.execute(
            sql,
            rusqlite::params![
                prompt.id,
                prompt.project_id,
                prompt.folder_id,
                prompt.title,
                tags_json,
                prompt.is_favorite,
                prompt.created_at,
                prompt.current_version_id
            ],
        )?;
        Ok(())
    }

    fn query_prompts(
        conn: &Connection,
        sql: &str,
        key: Option<&str>,
    ) -> StoreResult<Vec<Prompt>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = match key {
            Some(key) => stmt.query_map([key], Self::row_to_prompt)?,
            None => stmt.query_map([], Self::row_to_prompt)?,
        };
        let mut prompts = rows.collect::<Result<Vec<_>, _>>()?;
        for prompt in &mut prompts {
            prompt.versions = list_for_prompt(conn, &prompt.id)?;
        }
        Ok(prompts)
    }

    fn load(conn: &Connection, id: &str) -> StoreResult<Option<Prompt>> {
        let prompt = conn
            .query_row(
                &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1"),
                [id],
                Self::row_to_prompt,
            )
            .optional()?;
        match prompt {
            Some(mut prompt) => {
                prompt.versions = list_for_prompt(conn, &prompt.id)?;
                Ok(Some(prompt))
            }
            None => Ok(None),
        }
    }

    fn row_to_prompt(row: &Row) -> rusqlite::Result<Prompt> {
        Ok(Prompt {
            id: row.get(0)?,
            project_id: row.get(1)?,
            folder_id: row.get(2)?,
            title: row.get(3)?,
            tags: json_column(row, 4)?,
            is_favorite: row.get(5)?,
            created_at: row.get(6)?,
            current_version_id: row.get(7)?,
            versions: Vec::new(),
        })
    }
}
