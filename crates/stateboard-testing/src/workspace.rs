//! Temporary workspace directories.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding an index database and config file.
///
/// Removed when dropped.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("stateboard.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// Write a config file into the workspace and return its path
    pub fn write_config(&self, content: &str) -> std::io::Result<PathBuf> {
        let path = self.config_path();
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
