use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::instance_key::InstanceKey;

/// A decoded Terraform state file.
///
/// Produced by a statefile decoder (outside this workspace) and handed to the
/// index for ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// Terraform binary version that wrote the state (e.g. "1.5.7")
    pub terraform_version: String,
    /// Per-lineage snapshot counter
    pub serial: u64,
    /// Lifeline identifier shared by every snapshot of the same state
    pub lineage: String,
    #[serde(default)]
    pub state: State,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// One module of the state, addressed by its module path
/// (`""` for the root module, `module.network` for a child).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub addr: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub mode: ResourceMode,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub instances: Vec<ResourceInstance>,
}

/// Management mode of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

impl ResourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceMode::Managed => "managed",
            ResourceMode::Data => "data",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "managed" => Some(ResourceMode::Managed),
            "data" => Some(ResourceMode::Data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(default)]
    pub index_key: InstanceKey,
    /// Current object; deposed objects are not indexed
    #[serde(default)]
    pub current: Option<InstanceObject>,
}

/// Attribute payload of one instance object.
///
/// Older states carry `attrs_flat` (flatmap encoding), newer ones carry
/// `attrs_json`. When both are present the flat map wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs_flat: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs_json: Option<String>,
    #[serde(default)]
    pub status: ObjectStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    #[default]
    Ready,
    Tainted,
}

impl StateFile {
    /// Total number of resources across all modules
    pub fn resource_count(&self) -> usize {
        self.state.modules.iter().map(|m| m.resources.len()).sum()
    }
}
