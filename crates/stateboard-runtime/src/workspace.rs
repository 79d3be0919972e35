use stateboard_index::Database;
use std::path::{Path, PathBuf};

use crate::{Config, Result, config};

/// A resolved workspace directory with its configuration.
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Resolve the workspace directory and load its `config.toml`.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let root = config::resolve_workspace_path(explicit_path)?;
        Self::load_at(root)
    }

    pub fn load_at(root: PathBuf) -> Result<Self> {
        let config = Config::load_from(&root.join(config::CONFIG_FILE))?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database_path(&self) -> PathBuf {
        self.config.database_path(&self.root)
    }

    /// Open (or create) the index database, creating parent directories.
    pub fn open_database(&self) -> Result<Database> {
        let db_path = self.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(path = %db_path.display(), "opening index database");
        Ok(Database::open(&db_path)?)
    }
}
