//! In-memory state provider for testing sync logic.
//!
//! Stores versions and decoded state files per path, and can be told to fail
//! on specific paths or entirely, mimicking an unreachable backend.

use stateboard_providers::{Error, Result, StateProvider};
use stateboard_types::{LockInfo, StateFile, Version};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryProvider {
    name: String,
    states: BTreeMap<String, Vec<(Version, StateFile)>>,
    locks: HashMap<String, LockInfo>,
    failing_paths: HashSet<String>,
    unavailable: bool,
    fetches: AtomicUsize,
}

impl MemoryProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add one version of a path. Versions are reported in insertion order.
    pub fn with_state(mut self, path: &str, version: Version, file: StateFile) -> Self {
        self.states
            .entry(path.to_string())
            .or_default()
            .push((version, file));
        self
    }

    pub fn with_lock(mut self, path: &str, lock: LockInfo) -> Self {
        self.locks.insert(path.to_string(), lock);
        self
    }

    /// Make `get_state` fail for every version of `path`
    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing_paths.insert(path.to_string());
        self
    }

    /// Make every call fail, as if the backend were unreachable
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of successful `get_state` calls so far
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::Backend(format!("{}: connection refused", self.name)));
        }
        Ok(())
    }
}

impl StateProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_locks(&self) -> Result<HashMap<String, LockInfo>> {
        self.check_available()?;
        Ok(self.locks.clone())
    }

    fn get_versions(&self, path: &str) -> Result<Vec<Version>> {
        self.check_available()?;
        let versions = self
            .states
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?
            .iter()
            .map(|(version, _)| version.clone())
            .collect();
        Ok(versions)
    }

    fn get_states(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.states.keys().cloned().collect())
    }

    fn get_state(&self, path: &str, version_id: &str) -> Result<StateFile> {
        self.check_available()?;
        if self.failing_paths.contains(path) {
            return Err(Error::Backend(format!("{}: failed to read state", path)));
        }

        let file = self
            .states
            .get(path)
            .and_then(|versions| versions.iter().find(|(v, _)| v.id == version_id))
            .map(|(_, file)| file.clone())
            .ok_or_else(|| Error::NotFound(format!("{}@{}", path, version_id)))?;

        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(file)
    }
}
