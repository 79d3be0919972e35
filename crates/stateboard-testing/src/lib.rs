//! Testing infrastructure for stateboard integration tests.
//!
//! - `fixtures`: builders for decoded state files
//! - `providers`: an in-memory `StateProvider` with failure injection
//! - `workspace`: temporary directories for on-disk indexes and configs

pub mod fixtures;
pub mod providers;
pub mod workspace;

pub use fixtures::StateFileBuilder;
pub use providers::MemoryProvider;
pub use workspace::TestWorkspace;
