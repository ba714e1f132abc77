//! Playbook generation pipeline, the entrypoint used by the CLI and by the
//! request layer after a cluster's components or hosts change.
//!
//! For every `(component, descriptor)` in the model, in component-name order:
//!
//! 1. Validate the entry and resolve `<root>/<component>-playbook/<version>/`.
//! 2. Classify the template directory (fails before any write if the hosts
//!    template is missing).
//! 3. Provision `clusters/<cluster_id>/` (and `group_vars/` when needed).
//! 4. Render and write every descriptor in listing order.
//!
//! The first failure aborts the run. Files already written stay in place;
//! running again rewrites every file, so a re-run is self-correcting.

use std::path::{Path, PathBuf};

use pagoda_core::{ClusterId, ComponentDescriptor, ComponentName, DeploymentModel};
use pagoda_renderer::{RenderContext, TemplateEngine};

use crate::classify::{classify, TemplateDescriptor};
use crate::error::PlaybookError;
use crate::layout::PlaybookLayout;
use crate::provision::provision;
use crate::writer::{apply_template, WriteResult};

/// Knobs for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub layout: PlaybookLayout,
    /// Render everything but create no directories or files.
    pub dry_run: bool,
}

/// What generation will do for one component: its paths and classified files.
#[derive(Debug, Clone)]
pub struct PlaybookPlan {
    pub component: ComponentName,
    pub version: String,
    pub cluster_id: ClusterId,
    pub playbook_root: PathBuf,
    pub output_root: PathBuf,
    pub descriptors: Vec<TemplateDescriptor>,
    /// Whether provisioning creates `group_vars/`.
    pub group_vars: bool,
}

/// Outcome of generating one component.
#[derive(Debug)]
pub struct PlaybookReport {
    pub component: ComponentName,
    pub version: String,
    pub cluster_id: ClusterId,
    pub output_root: PathBuf,
    pub writes: Vec<WriteResult>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Validate and classify one component without writing anything.
pub fn plan_component(
    root: &Path,
    component: &ComponentName,
    descriptor: &ComponentDescriptor,
    layout: &PlaybookLayout,
) -> Result<PlaybookPlan, PlaybookError> {
    let cluster_id = descriptor.validate(component)?;
    let playbook_root = layout.playbook_root(root, component, &descriptor.version);
    let templates = classify(&playbook_root, &cluster_id, layout)
        .map_err(|e| in_component(component, &descriptor.version, &cluster_id, e))?;
    let output_root = layout.cluster_root(&playbook_root, &cluster_id);

    Ok(PlaybookPlan {
        component: component.clone(),
        version: descriptor.version.clone(),
        cluster_id,
        playbook_root,
        output_root,
        group_vars: templates.needs_group_vars(),
        descriptors: templates.descriptors,
    })
}

/// Plan every component in the model.
pub fn plan_playbooks(
    root: &Path,
    model: &DeploymentModel,
    layout: &PlaybookLayout,
) -> Result<Vec<PlaybookPlan>, PlaybookError> {
    model
        .iter()
        .map(|(name, descriptor)| plan_component(root, name, descriptor, layout))
        .collect()
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate artifacts for every component in the model.
///
/// Components are processed sequentially in name order; the first failure is
/// returned and the remaining components are not touched.
pub fn prepare_playbooks(
    root: &Path,
    model: &DeploymentModel,
    options: &GenerateOptions,
) -> Result<Vec<PlaybookReport>, PlaybookError> {
    let engine = TemplateEngine::new();
    let ctx = RenderContext::from_model(model)?;

    let mut reports = Vec::with_capacity(model.len());
    for (name, descriptor) in model.iter() {
        let plan = plan_component(root, name, descriptor, &options.layout)?;
        reports.push(execute_plan(plan, &engine, &ctx, options)?);
    }
    Ok(reports)
}

/// Generate artifacts for a single component of `model`.
///
/// The whole model is still bound as template context, so the component's
/// templates may reference its siblings.
pub fn prepare_playbook(
    root: &Path,
    model: &DeploymentModel,
    component: &ComponentName,
    options: &GenerateOptions,
) -> Result<PlaybookReport, PlaybookError> {
    let descriptor = model.get(component).ok_or_else(|| {
        PlaybookError::Model(pagoda_core::ModelError::InvalidModel {
            component: component.0.clone(),
            reason: "not present in the deployment model".to_string(),
        })
    })?;
    let engine = TemplateEngine::new();
    let ctx = RenderContext::from_model(model)?;
    let plan = plan_component(root, component, descriptor, &options.layout)?;
    execute_plan(plan, &engine, &ctx, options)
}

fn execute_plan(
    plan: PlaybookPlan,
    engine: &TemplateEngine,
    ctx: &RenderContext,
    options: &GenerateOptions,
) -> Result<PlaybookReport, PlaybookError> {
    let wrap = |e| in_component(&plan.component, &plan.version, &plan.cluster_id, e);

    if !options.dry_run {
        provision(
            &plan.playbook_root,
            &plan.cluster_id,
            &options.layout,
            plan.group_vars,
        )
        .map_err(wrap)?;
    }

    let mut writes = Vec::with_capacity(plan.descriptors.len());
    for descriptor in &plan.descriptors {
        writes.push(apply_template(descriptor, engine, ctx, options.dry_run).map_err(wrap)?);
    }

    tracing::info!(
        "generated {} {} for cluster {} ({} files)",
        plan.component,
        plan.version,
        plan.cluster_id,
        writes.len()
    );

    Ok(PlaybookReport {
        component: plan.component,
        version: plan.version,
        cluster_id: plan.cluster_id,
        output_root: plan.output_root,
        writes,
    })
}

fn in_component(
    component: &ComponentName,
    version: &str,
    cluster_id: &ClusterId,
    source: PlaybookError,
) -> PlaybookError {
    PlaybookError::Component {
        component: component.0.clone(),
        version: version.to_string(),
        cluster_id: cluster_id.0.clone(),
        source: Box::new(source),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
