//! Pagoda core library: the deployment model and the catalog records it is composed from.
//!
//! - [`model`]: [`DeploymentModel`] and [`ComponentDescriptor`], loading and composition
//! - [`types`]: newtypes and catalog records
//! - [`error`]: [`ModelError`]

pub mod error;
pub mod model;
pub mod types;

pub use error::ModelError;
pub use model::{compose_component, ComponentDescriptor, DeploymentModel, CLUSTER_ID_KEY};
pub use types::{
    Cluster, ClusterId, ClusterState, ComponentName, ComponentRecord, Host, HostId,
};
