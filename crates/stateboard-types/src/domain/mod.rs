pub mod instance_key;
pub mod state;
pub mod version;

pub use instance_key::*;
pub use state::*;
pub use version::*;
