//! Provider contract for Terraform state backends.
//!
//! Backend connectors (Terraform Enterprise, GCS, Gitlab, S3+DynamoDB) live
//! outside this workspace and implement [`StateProvider`]. The sync service
//! only ever talks to the trait.

pub mod error;
pub mod traits;

pub use error::{Error, Result};
pub use traits::{ProviderSet, StateProvider};
