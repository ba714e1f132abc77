//! `pagoda diff` — show unified diffs for what generation would write.

use anyhow::{Context, Result};
use clap::Args;

use pagoda_playbook::diff_playbooks;

use super::ModelArgs;

/// Arguments for `pagoda diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: ModelArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let (model, layout) = self.input.load()?;

        let diffs =
            diff_playbooks(&self.input.root, &model, &layout).context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
