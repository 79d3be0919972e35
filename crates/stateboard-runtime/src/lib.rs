// Runtime layer
// Workspace configuration and the provider -> index sync pass

pub mod config;
pub mod error;
pub mod sync;
pub mod workspace;

pub use config::{Config, DatabaseConfig, resolve_workspace_path};
pub use error::{Error, Result};
pub use sync::{SyncProgress, SyncService};
pub use workspace::Workspace;
