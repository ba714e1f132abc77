//! `pagoda generate` — render and write every component's cluster artifacts.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pagoda_playbook::{prepare_playbooks, GenerateOptions, PlaybookReport, WriteResult};

use super::{display_path, ModelArgs};

/// Arguments for `pagoda generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: ModelArgs,

    /// Render everything but do not create any directories or files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let (model, layout) = self.input.load()?;
        if model.is_empty() {
            println!("Model is empty. Nothing to generate.");
            return Ok(());
        }

        let options = GenerateOptions {
            layout,
            dry_run: self.dry_run,
        };
        let reports = prepare_playbooks(&self.input.root, &model, &options)
            .context("playbook generation failed")?;

        for report in &reports {
            print_report(&self.input, report, self.dry_run);
        }
        Ok(())
    }
}

fn print_report(input: &ModelArgs, report: &PlaybookReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} {} → cluster {} ({} files)",
        "✓".green(),
        report.component,
        report.version,
        report.cluster_id,
        report.writes.len()
    );
    for write in &report.writes {
        let marker = match write {
            WriteResult::Written { .. } => "✎",
            WriteResult::WouldWrite { .. } => "~",
        };
        println!("  {marker}  {}", display_path(&input.root, write.path()));
    }
}
