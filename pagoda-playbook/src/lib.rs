//! # pagoda-playbook
//!
//! Turns a [`DeploymentModel`](pagoda_core::DeploymentModel) and a tree of
//! playbook templates into per-cluster Ansible inventories and group vars.
//!
//! Call [`prepare_playbooks`] to generate every component in a model, or
//! [`prepare_playbook`] for a single one. [`plan_playbooks`] and
//! [`diff_playbooks`] preview a run without writing.

pub mod classify;
pub mod diff;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod provision;
pub mod writer;

pub use classify::{classify, TemplateDescriptor, TemplateKind, TemplateSet};
pub use diff::{diff_playbooks, FileDiff};
pub use error::PlaybookError;
pub use layout::{PlaybookLayout, LAYOUT_FILE};
pub use pipeline::{
    plan_playbooks, prepare_playbook, prepare_playbooks, GenerateOptions, PlaybookPlan,
    PlaybookReport,
};
pub use provision::provision;
pub use writer::{apply_template, render_descriptor, WriteResult};
