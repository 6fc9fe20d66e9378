//! SQLite database setup and connection management for Promptvault
//! Handles database initialization, schema creation, and the process-wide shared handle.

use crate::domain::{ModelSettings, StoreError, StoreResult};
use crate::infra::app_config;
use crate::infra::db::repository::{
    DbConn, FolderRepository, ProjectRepository, PromptRepository, PromptVersionRepository,
    TagRepository,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SCHEMA_VERSION: i32 = 1;

static SHARED: OnceCell<Database> = OnceCell::new();

/// Database wrapper that manages the SQLite connection
pub struct Database {
    conn: DbConn,
    default_model: ModelSettings,
}

impl Database {
    /// Create or open the database at the configured location
    pub fn open() -> StoreResult<Self> {
        let config = app_config::load_config();
        let path = Self::default_path(config.database_path.as_deref());
        Ok(Self::open_at(path)?.with_default_model(config.default_model))
    }

    /// Process-wide handle, opened on first use.
    ///
    /// Concurrent first callers block until one of them has finished opening
    /// the store; a failed open is not cached, so a later call tries again.
    pub fn shared() -> StoreResult<&'static Database> {
        SHARED.get_or_try_init(Self::open)
    }

    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::StorageUnavailable(format!("in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::StorageUnavailable(format!("{}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(&path)
            .map_err(|e| StoreError::StorageUnavailable(format!("{}: {}", path.display(), e)))?;
        let db = Self::from_connection(conn)?;
        log::debug!("Opened prompt store at {}", path.display());
        Ok(db)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            default_model: ModelSettings::default(),
        };
        db.init().map_err(|e| match e {
            StoreError::StorageUnavailable(_) => e,
            other => StoreError::StorageUnavailable(other.to_string()),
        })?;
        Ok(db)
    }

    /// Settings given to the first version of every new prompt.
    pub fn with_default_model(mut self, settings: ModelSettings) -> Self {
        self.default_model = settings;
        self
    }

    pub fn default_model(&self) -> ModelSettings {
        self.default_model
    }

    /// Get the default database path
    fn default_path(configured: Option<&Path>) -> PathBuf {
        if let Ok(path) = std::env::var("PROMPTVAULT_DB_PATH") {
            return PathBuf::from(path);
        }
        if let Some(path) = configured {
            return path.to_path_buf();
        }
        app_config::app_data_dir().join("db.sqlite")
    }

    /// Initialize database schema
    fn init(&self) -> StoreResult<()> {
        let conn = self.conn.lock();

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version > SCHEMA_VERSION {
            return Err(StoreError::StorageUnavailable(format!(
                "database schema version {} is newer than supported version {}",
                existing_version, SCHEMA_VERSION
            )));
        }

        // Every statement is guarded by IF NOT EXISTS, so re-running is harmless.
        Self::create_schema(&conn)?;
        if existing_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            log::info!(
                "Initialized prompt store schema (v{} -> v{})",
                existing_version,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> DbConn {
        self.conn.clone()
    }

    pub fn project_repo(&self) -> ProjectRepository {
        ProjectRepository::new(self.connection())
    }

    pub fn folder_repo(&self) -> FolderRepository {
        FolderRepository::new(self.connection())
    }

    pub fn prompt_repo(&self) -> PromptRepository {
        PromptRepository::new(self.connection()).with_default_settings(self.default_model)
    }

    pub fn version_repo(&self) -> PromptVersionRepository {
        PromptVersionRepository::new(self.connection())
    }

    pub fn tag_repo(&self) -> TagRepository {
        TagRepository::new(self.connection())
    }

    fn create_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                color TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS folders (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                parent_folder_id TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                folder_id TEXT,
                title TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                is_favorite INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                current_version_id TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS prompt_versions (
                id TEXT PRIMARY KEY,
                prompt_id TEXT NOT NULL,
                version_number INTEGER NOT NULL CHECK (version_number >= 1),
                content TEXT NOT NULL,
                model_settings TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_folders_project_id ON folders(project_id);
            CREATE INDEX IF NOT EXISTS idx_folders_parent_folder_id ON folders(parent_folder_id);
            CREATE INDEX IF NOT EXISTS idx_prompts_project_id ON prompts(project_id);
            CREATE INDEX IF NOT EXISTS idx_prompts_folder_id ON prompts(folder_id);
            CREATE INDEX IF NOT EXISTS idx_prompt_versions_prompt_id ON prompt_versions(prompt_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_prompt_versions_prompt_number
                ON prompt_versions(prompt_id, version_number);
            "#,
        )?;
        Ok(())
    }
}
