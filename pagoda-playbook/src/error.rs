//! Error types for pagoda-playbook.

use std::path::PathBuf;

use thiserror::Error;

use pagoda_core::ModelError;
use pagoda_renderer::RenderError;

/// All errors that can arise while generating playbook artifacts.
///
/// Per-file and per-directory failures are wrapped in
/// [`PlaybookError::Component`] by the pipeline so the caller always learns
/// which component, version and cluster were being generated.
#[derive(Debug, Error)]
pub enum PlaybookError {
    /// The template directory could not be listed.
    #[error("cannot list template directory {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template directory has no hosts template.
    #[error("required template '{name}' not found in {dir}")]
    MissingRequiredTemplate { dir: PathBuf, name: String },

    /// An output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    ProvisionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template or static source file could not be read.
    #[error("cannot read source file {path}: {source}")]
    SourceReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination file could not be created or written.
    #[error("cannot write {path}: {source}")]
    DestinationWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template failed to parse or execute (including missing keys).
    #[error("cannot render {path}: {source}")]
    TemplateExecutionError {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// The deployment model entry is unusable.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The deployment model could not be bound as a template context.
    #[error(transparent)]
    Context(#[from] RenderError),

    /// `pagoda.yaml` exists but is not a valid layout.
    #[error("invalid layout config at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A failure inside one component's generation.
    #[error("{component} {version} (cluster {cluster_id}): {source}")]
    Component {
        component: String,
        version: String,
        cluster_id: String,
        #[source]
        source: Box<PlaybookError>,
    },
}

impl PlaybookError {
    /// The underlying error with any [`PlaybookError::Component`] context removed.
    pub fn root_cause(&self) -> &PlaybookError {
        match self {
            PlaybookError::Component { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
