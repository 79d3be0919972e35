//! Builders for decoded state files.
//!
//! ```
//! # use stateboard_testing::StateFileBuilder;
//! let file = StateFileBuilder::new("lineage-a")
//!     .serial(3)
//!     .resource("aws_instance", "web")
//!     .instance(0, serde_json::json!({"ami": "ami-123"}))
//!     .build();
//! assert_eq!(file.resource_count(), 1);
//! ```

use serde_json::Value;
use stateboard_types::{
    InstanceKey, InstanceObject, Module, Resource, ResourceInstance, ResourceMode, State,
    StateFile,
};
use std::collections::BTreeMap;

/// Fluent builder for [`StateFile`].
///
/// Resources are added to the most recently declared module (the root module
/// by default); instances to the most recently declared resource.
pub struct StateFileBuilder {
    file: StateFile,
}

impl StateFileBuilder {
    pub fn new(lineage: &str) -> Self {
        Self {
            file: StateFile {
                terraform_version: "1.0.0".to_string(),
                serial: 1,
                lineage: lineage.to_string(),
                state: State {
                    modules: vec![Module::default()],
                },
            },
        }
    }

    pub fn serial(mut self, serial: u64) -> Self {
        self.file.serial = serial;
        self
    }

    pub fn terraform_version(mut self, version: &str) -> Self {
        self.file.terraform_version = version.to_string();
        self
    }

    /// Start a child module, e.g. `module.network`
    pub fn module(mut self, addr: &str) -> Self {
        self.file.state.modules.push(Module {
            addr: addr.to_string(),
            resources: Vec::new(),
        });
        self
    }

    pub fn resource(self, resource_type: &str, name: &str) -> Self {
        self.push_resource(ResourceMode::Managed, resource_type, name)
    }

    pub fn data_resource(self, resource_type: &str, name: &str) -> Self {
        self.push_resource(ResourceMode::Data, resource_type, name)
    }

    /// Add an instance with a JSON attribute tree
    pub fn instance(self, key: impl Into<InstanceKey>, attrs: Value) -> Self {
        self.push_instance(ResourceInstance {
            index_key: key.into(),
            current: Some(InstanceObject {
                attrs_json: Some(attrs.to_string()),
                ..Default::default()
            }),
        })
    }

    /// Add a singleton instance with a JSON attribute tree
    pub fn single(self, attrs: Value) -> Self {
        self.instance(InstanceKey::NoKey, attrs)
    }

    /// Add an instance carrying legacy flat attributes
    pub fn flat_instance(self, key: impl Into<InstanceKey>, attrs: &[(&str, &str)]) -> Self {
        let flat: BTreeMap<String, String> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.push_instance(ResourceInstance {
            index_key: key.into(),
            current: Some(InstanceObject {
                attrs_flat: Some(flat),
                ..Default::default()
            }),
        })
    }

    /// Add an instance whose raw `attrs_json` text is used as-is
    pub fn raw_instance(self, key: impl Into<InstanceKey>, attrs_json: &str) -> Self {
        self.push_instance(ResourceInstance {
            index_key: key.into(),
            current: Some(InstanceObject {
                attrs_json: Some(attrs_json.to_string()),
                ..Default::default()
            }),
        })
    }

    pub fn build(self) -> StateFile {
        self.file
    }

    fn push_resource(mut self, mode: ResourceMode, resource_type: &str, name: &str) -> Self {
        if let Some(module) = self.file.state.modules.last_mut() {
            module.resources.push(Resource {
                mode,
                resource_type: resource_type.to_string(),
                name: name.to_string(),
                instances: Vec::new(),
            });
        }
        self
    }

    fn push_instance(mut self, instance: ResourceInstance) -> Self {
        let resource = self
            .file
            .state
            .modules
            .last_mut()
            .and_then(|m| m.resources.last_mut())
            .expect("declare a resource before adding instances");
        resource.instances.push(instance);
        self
    }
}

/// The single-resource state used across search tests:
/// `test_thing.baz` with attribute `woozles = "confuzles"` on Terraform 1.0.0.
pub fn woozles_state(lineage: &str, serial: u64) -> StateFile {
    StateFileBuilder::new(lineage)
        .serial(serial)
        .resource("test_thing", "baz")
        .single(serde_json::json!({"woozles": "confuzles"}))
        .build()
}
