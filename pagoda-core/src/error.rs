//! Error types for pagoda-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading, validating or composing a
/// deployment model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model file could not be read.
    #[error("cannot read deployment model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml's line context.
    #[error("failed to parse deployment model at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error on load.
    #[error("failed to parse deployment model at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A descriptor is structurally unusable (bad `cluster_id`, bad version, …).
    #[error("invalid deployment model entry '{component}': {reason}")]
    InvalidModel { component: String, reason: String },

    /// A component record references a host the cluster does not have.
    #[error("component '{component}' role '{role}' references unknown host '{host}'")]
    UnknownHost {
        component: String,
        role: String,
        host: String,
    },
}
