//! Error types for pagoda-renderer.

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The deployment model could not be turned into a Tera context.
    #[error("cannot build template context: {0}")]
    Context(#[source] tera::Error),

    /// Parsing or executing a template failed, including references to keys
    /// the model does not have.
    #[error("template '{name}' failed: {detail}")]
    Template {
        name: String,
        /// Tera's full error chain flattened to one line.
        detail: String,
        #[source]
        source: tera::Error,
    },
}

impl RenderError {
    pub(crate) fn template(name: &str, source: tera::Error) -> Self {
        RenderError::Template {
            name: name.to_string(),
            detail: error_chain(&source),
            source,
        }
    }
}

/// Tera puts the useful part ("Variable `x` not found …") in the source chain,
/// not in the top-level message.
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
