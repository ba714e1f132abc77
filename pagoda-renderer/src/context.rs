//! Template context: the deployment model bound as Tera's data root.

use pagoda_core::DeploymentModel;

use crate::error::RenderError;

/// The single data context every template in a run renders against.
///
/// Top-level template variables are component names, so `{{ web.version }}`
/// and `{{ web.inherent.cluster_id }}` resolve directly.
#[derive(Debug, Clone)]
pub struct RenderContext {
    inner: tera::Context,
    /// The same data as one JSON tree, for resolving paths ahead of a render.
    data: tera::Value,
}

impl RenderContext {
    /// Build a [`RenderContext`] from a [`DeploymentModel`].
    pub fn from_model(model: &DeploymentModel) -> Result<Self, RenderError> {
        let inner = tera::Context::from_serialize(model).map_err(RenderError::Context)?;
        let data = inner.clone().into_json();
        Ok(RenderContext { inner, data })
    }

    pub fn as_tera(&self) -> &tera::Context {
        &self.inner
    }

    pub(crate) fn data(&self) -> &tera::Value {
        &self.data
    }
}
