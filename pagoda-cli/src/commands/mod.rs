pub mod diff;
pub mod generate;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pagoda_core::DeploymentModel;
use pagoda_playbook::PlaybookLayout;

/// Inputs shared by every subcommand.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Deployment model file (`.json`, otherwise YAML).
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// Directory holding the `<component>-playbook/` trees.
    #[arg(long, env = "PAGODA_ROOT", default_value = ".")]
    pub root: PathBuf,
}

impl ModelArgs {
    pub fn load(&self) -> Result<(DeploymentModel, PlaybookLayout)> {
        let model = DeploymentModel::from_path(&self.model)
            .with_context(|| format!("failed to load model {}", self.model.display()))?;
        let layout = PlaybookLayout::load_at(&self.root).with_context(|| {
            format!("failed to load layout under {}", self.root.display())
        })?;
        tracing::debug!(
            "loaded {} components from {}",
            model.len(),
            self.model.display()
        );
        Ok((model, layout))
    }
}

/// `path` relative to `root` when possible, for shorter output lines.
pub(crate) fn display_path<'a>(root: &Path, path: &'a Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}
