use stateboard_types::{LockInfo, StateFile, Version};
use std::collections::HashMap;

use crate::Result;

/// Uniform access to one Terraform state backend
///
/// Responsibilities:
/// - List the state paths the backend stores
/// - List the versions of each path
/// - Fetch and decode one version of one path
/// - Report currently held locks
pub trait StateProvider: Send + Sync {
    /// Human-readable backend name, used in logs and progress events
    fn name(&self) -> &str;

    /// Locks currently held, keyed by state path
    fn get_locks(&self) -> Result<HashMap<String, LockInfo>>;

    /// Versions of one state path, as ordered by the backend
    fn get_versions(&self, path: &str) -> Result<Vec<Version>>;

    /// Every state path known to the backend
    fn get_states(&self) -> Result<Vec<String>>;

    /// Fetch and decode one version of a state.
    /// Must return an error when the state cannot be produced.
    fn get_state(&self, path: &str, version_id: &str) -> Result<StateFile>;
}

/// Ordered collection of configured providers
pub struct ProviderSet {
    providers: Vec<Box<dyn StateProvider>>,
}

impl ProviderSet {
    pub fn iter(&self) -> impl Iterator<Item = &dyn StateProvider> {
        self.providers
            .iter()
            .map(|p| -> &dyn StateProvider { p.as_ref() })
    }
}

impl From<Vec<Box<dyn StateProvider>>> for ProviderSet {
    fn from(providers: Vec<Box<dyn StateProvider>>) -> Self {
        Self { providers }
    }
}
