//! # pagoda-renderer
//!
//! Tera-based template engine that renders playbook templates against a
//! [`DeploymentModel`](pagoda_core::DeploymentModel).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pagoda_core::DeploymentModel;
//! use pagoda_renderer::{RenderContext, TemplateEngine};
//!
//! fn render_hosts(model: &DeploymentModel, source: &str) {
//!     let engine = TemplateEngine::new();
//!     if let Ok(ctx) = RenderContext::from_model(model) {
//!         match engine.render("hosts.tera", source, &ctx) {
//!             Ok(out) => println!("{out}"),
//!             Err(e) => eprintln!("{e}"),
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;
mod strict;

pub use context::RenderContext;
pub use engine::TemplateEngine;
pub use error::RenderError;
