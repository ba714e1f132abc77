//! Tera rendering engine for playbook templates.
//!
//! Templates are read from the playbook source tree at generation time, so the
//! engine keeps no template registry of its own: each call parses one source
//! against a pre-configured base [`Tera`] (helpers registered, autoescape off)
//! and renders it.
//!
//! Undefined references are errors. Tera rejects `{{ web.missing }}` itself;
//! conditions, which Tera treats as false when undefined, are resolved first
//! by [`crate::strict`]. A silent blank in an Ansible inventory is worse than
//! a failed run. Optional keys use `is defined` or the `default` filter.

use tera::Tera;

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::helpers;
use crate::strict;

/// Tera-based engine for rendering playbook templates.
///
/// Create once per generation run and reuse for every file.
#[derive(Clone)]
pub struct TemplateEngine {
    base: Tera,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`] with every helper registered.
    pub fn new() -> Self {
        let mut base = Tera::default();
        // Outputs are INI / YAML, never HTML.
        base.autoescape_on(vec![]);
        helpers::register(&mut base);
        TemplateEngine { base }
    }

    /// Parse `source` as a template called `name` and render it with `ctx`.
    ///
    /// `name` only appears in error messages; callers pass the source path.
    /// The output is returned exactly as rendered.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        let mut tera = self.base.clone();
        tera.add_raw_template(name, source)
            .map_err(|e| RenderError::template(name, e))?;

        let template = tera
            .get_template(name)
            .map_err(|e| RenderError::template(name, e))?;
        if let Some(missing) = strict::undefined_condition(&template.ast, ctx.data()) {
            return Err(RenderError::template(
                name,
                tera::Error::msg(format!(
                    "Variable `{missing}` not found in context while evaluating a condition"
                )),
            ));
        }

        tera.render(name, ctx.as_tera())
            .map_err(|e| RenderError::template(name, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
