use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stateboard_types::ResourceMode;

/// Version row from the index database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: i64,
    /// Backend version identifier.
    pub version_id: String,
    /// Backend-reported modification time, if known.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Lineage summary for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRecord {
    pub value: String,
    /// Number of ingested snapshots.
    pub state_count: usize,
    /// Path of the latest snapshot.
    pub latest_path: Option<String>,
    /// Serial of the latest snapshot.
    pub latest_serial: Option<i64>,
}

/// One entry of a lineage timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageActivity {
    pub path: String,
    pub version_id: String,
    pub serial: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Key/value pair of one instance.
///
/// Values taken from JSON attribute trees are compact JSON text
/// (`"bar"` including quotes); legacy flat attributes are stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeValue {
    pub key: String,
    pub value: String,
}

/// A fully loaded state snapshot with its module tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: i64,
    /// Backend storage key of the state.
    pub path: String,
    pub lineage: String,
    pub version_id: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub terraform_version: String,
    pub serial: i64,
    pub modules: Vec<ModuleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: i64,
    /// Module address (`""` for the root module).
    pub path: String,
    pub resources: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub mode: ResourceMode,
    pub instances: Vec<InstanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: i64,
    /// Rendered instance key: `""`, `[N]` or `["S"]`.
    pub index_key: String,
    pub attributes: Vec<AttributeValue>,
}

/// Attribute search filters. Every `Some` field must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default, rename = "name")]
    pub resource_name: Option<String>,
    #[serde(default, rename = "key")]
    pub attribute_key: Option<String>,
    #[serde(default, rename = "value")]
    pub attribute_value: Option<String>,
    #[serde(default)]
    pub tf_version: Option<String>,
    #[serde(default, rename = "versionid")]
    pub version_id: Option<String>,
    #[serde(default, rename = "lineage_value")]
    pub lineage: Option<String>,
    /// 1-based page number; 0 is treated as 1.
    #[serde(default)]
    pub page: usize,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource_type(mut self, value: impl Into<String>) -> Self {
        self.resource_type = Some(value.into());
        self
    }

    pub fn resource_name(mut self, value: impl Into<String>) -> Self {
        self.resource_name = Some(value.into());
        self
    }

    pub fn attribute_key(mut self, value: impl Into<String>) -> Self {
        self.attribute_key = Some(value.into());
        self
    }

    pub fn attribute_value(mut self, value: impl Into<String>) -> Self {
        self.attribute_value = Some(value.into());
        self
    }

    pub fn tf_version(mut self, value: impl Into<String>) -> Self {
        self.tf_version = Some(value.into());
        self
    }

    pub fn version_id(mut self, value: impl Into<String>) -> Self {
        self.version_id = Some(value.into());
        self
    }

    pub fn lineage(mut self, value: impl Into<String>) -> Self {
        self.lineage = Some(value.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Effective 1-based page number
    pub fn page_number(&self) -> usize {
        self.page.max(1)
    }
}

/// One matching attribute with its location in the state tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    pub version_id: String,
    pub tf_version: String,
    pub serial: i64,
    pub lineage_value: String,
    pub module_path: String,
    pub resource_type: String,
    pub resource_name: String,
    pub resource_index: String,
    pub attribute_key: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub page: usize,
    /// Matches across all pages.
    pub total: usize,
}

/// Latest snapshot of one lineage, with its resource count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStat {
    pub path: String,
    pub lineage_value: String,
    pub version_id: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub tf_version: String,
    pub serial: i64,
    pub resource_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPage {
    pub stats: Vec<StateStat>,
    pub page: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}
