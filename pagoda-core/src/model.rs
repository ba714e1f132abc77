//! Deployment model: the data context every playbook template renders against.
//!
//! The model maps component names to [`ComponentDescriptor`]s. Apart from
//! `version` and `inherent.cluster_id` the engine treats descriptor contents as
//! an open-ended `serde_json::Value` tree: templates may reference any key, and
//! the set of keys is decided by the template authors, not by this crate.
//!
//! # Example (YAML)
//!
//! ```yaml
//! web:
//!   version: "1.0"
//!   inherent:
//!     cluster_id: c1
//!     http_port: 8080
//!   hosts:
//!     master:
//!       - { id: h1, hostname: node-1, ip: 10.0.0.1 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ModelError;
use crate::types::{Cluster, ClusterId, ComponentName, ComponentRecord, Host, HostId};

/// Key inside `inherent` that scopes a component's output tree.
pub const CLUSTER_ID_KEY: &str = "cluster_id";

// ---------------------------------------------------------------------------
// ComponentDescriptor
// ---------------------------------------------------------------------------

/// Deployment descriptor for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Selects the `<component>-playbook/<version>/` template tree.
    pub version: String,
    /// Arbitrary properties; must contain `cluster_id`.
    #[serde(default)]
    pub inherent: Map<String, Value>,
    /// Role name → host entries. Only template content looks inside.
    #[serde(default)]
    pub hosts: Map<String, Value>,
    /// Any other keys the caller supplied, passed through to templates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentDescriptor {
    /// An empty descriptor for `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            inherent: Map::new(),
            hosts: Map::new(),
            extra: Map::new(),
        }
    }

    /// Set `inherent.cluster_id`.
    pub fn with_cluster_id(self, cluster_id: impl Into<String>) -> Self {
        self.with_inherent(CLUSTER_ID_KEY, cluster_id.into())
    }

    /// Set an arbitrary `inherent` property.
    pub fn with_inherent(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inherent.insert(key.into(), value.into());
        self
    }

    /// Attach the hosts playing `role`.
    pub fn with_role(mut self, role: impl Into<String>, members: Vec<Value>) -> Self {
        self.hosts.insert(role.into(), Value::Array(members));
        self
    }

    /// Extract and validate `inherent.cluster_id`.
    ///
    /// Strings are used as-is, numbers in their decimal rendering. Anything
    /// else, an empty value, or a value that is not a single path segment is
    /// rejected because it becomes an output directory name.
    pub fn cluster_id(&self, component: &ComponentName) -> Result<ClusterId, ModelError> {
        let invalid = |reason: String| ModelError::InvalidModel {
            component: component.0.clone(),
            reason,
        };
        let id = match self.inherent.get(CLUSTER_ID_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(invalid(format!(
                    "inherent.{CLUSTER_ID_KEY} must be a string, got {other}"
                )))
            }
            None => return Err(invalid(format!("inherent.{CLUSTER_ID_KEY} is missing"))),
        };
        check_segment(&id).map_err(|r| invalid(format!("inherent.{CLUSTER_ID_KEY} {r}")))?;
        Ok(ClusterId(id))
    }

    /// Validate everything the engine turns into paths and return the cluster id.
    pub fn validate(&self, component: &ComponentName) -> Result<ClusterId, ModelError> {
        check_segment(&component.0).map_err(|r| ModelError::InvalidModel {
            component: component.0.clone(),
            reason: format!("component name {r}"),
        })?;
        check_segment(&self.version).map_err(|r| ModelError::InvalidModel {
            component: component.0.clone(),
            reason: format!("version {r}"),
        })?;
        self.cluster_id(component)
    }
}

/// Reject values that would escape or collapse a single directory level.
fn check_segment(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("is empty");
    }
    if value == "." || value == ".." {
        return Err("is a relative path component");
    }
    if value.contains(['/', '\\', '\0']) {
        return Err("contains a path separator");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DeploymentModel
// ---------------------------------------------------------------------------

/// Component name → descriptor. Iteration order is by component name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentModel(pub BTreeMap<ComponentName, ComponentDescriptor>);

impl DeploymentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a component's descriptor.
    pub fn insert(
        &mut self,
        name: impl Into<ComponentName>,
        descriptor: ComponentDescriptor,
    ) -> Option<ComponentDescriptor> {
        self.0.insert(name.into(), descriptor)
    }

    pub fn get(&self, name: &ComponentName) -> Option<&ComponentDescriptor> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentName, &ComponentDescriptor)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate every entry; returns the first failure in component-name order.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, descriptor) in &self.0 {
            descriptor.validate(name)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load a model from a `.json` file, or from YAML for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&contents).map_err(|source| ModelError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_yaml::from_str(&contents).map_err(|source| ModelError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Composition from catalog records
    // -----------------------------------------------------------------------

    /// Build the model for one cluster from its catalog records.
    pub fn compose(
        cluster: &Cluster,
        hosts: &[Host],
        components: &[ComponentRecord],
    ) -> Result<Self, ModelError> {
        let mut model = Self::new();
        for record in components {
            let descriptor = compose_component(&cluster.id, record, hosts)?;
            model.insert(record.name.clone(), descriptor);
        }
        Ok(model)
    }

    /// Whether any component assigns `host` to a role.
    ///
    /// Role members may be bare id strings or host objects with an `id` key.
    pub fn host_in_use(&self, host: &HostId) -> bool {
        for descriptor in self.0.values() {
            for members in descriptor.hosts.values() {
                let Some(members) = members.as_array() else {
                    continue;
                };
                for member in members {
                    let id = match member {
                        Value::String(s) => Some(s.as_str()),
                        Value::Object(obj) => obj.get("id").and_then(Value::as_str),
                        _ => None,
                    };
                    if id == Some(host.0.as_str()) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Turn a catalog record into a descriptor: properties become `inherent`
/// (plus `cluster_id`), and host ids are resolved into full host entries.
pub fn compose_component(
    cluster_id: &ClusterId,
    record: &ComponentRecord,
    hosts: &[Host],
) -> Result<ComponentDescriptor, ModelError> {
    let mut descriptor = ComponentDescriptor::new(record.version.clone());
    descriptor.inherent = record.properties.clone();
    descriptor
        .inherent
        .insert(CLUSTER_ID_KEY.to_string(), Value::String(cluster_id.0.clone()));

    for (role, ids) in &record.hosts {
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            let host = hosts.iter().find(|h| &h.id == id).ok_or_else(|| {
                ModelError::UnknownHost {
                    component: record.name.0.clone(),
                    role: role.clone(),
                    host: id.0.clone(),
                }
            })?;
            members.push(host_value(host));
        }
        descriptor.hosts.insert(role.clone(), Value::Array(members));
    }
    Ok(descriptor)
}

fn host_value(host: &Host) -> Value {
    json!({
        "id": host.id.0,
        "hostname": host.hostname,
        "ip": host.ip,
        "description": host.description,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
