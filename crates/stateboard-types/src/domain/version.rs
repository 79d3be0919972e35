use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A backend-reported version of one state path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Backend version identifier (object generation, S3 version id, ...)
    pub id: String,
    /// None when the backend does not report a modification time
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Version {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// Lock held on a state path, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LockInfo {
    #[serde(rename = "ID")]
    pub id: String,
    pub operation: String,
    pub info: String,
    pub who: String,
    pub version: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    pub path: String,
}
