//! `pagoda plan` — list what generation would write, without writing.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use pagoda_playbook::{plan_playbooks, PlaybookPlan, TemplateKind};

use super::{display_path, ModelArgs};

/// Arguments for `pagoda plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: ModelArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let (model, layout) = self.input.load()?;
        let plans = plan_playbooks(&self.input.root, &model, &layout).context("planning failed")?;

        if self.json {
            return print_json(&self.input, &plans);
        }
        print_tables(&self.input, &plans);
        Ok(())
    }
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "destination")]
    destination: String,
}

#[derive(Serialize)]
struct PlanJson {
    component: String,
    version: String,
    cluster_id: String,
    output_root: String,
    files: Vec<PlanFileJson>,
}

#[derive(Serialize)]
struct PlanFileJson {
    kind: &'static str,
    source: String,
    destination: String,
}

fn kind_label(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::Hosts => "hosts",
        TemplateKind::GroupVars => "group_vars",
        TemplateKind::Static => "static",
    }
}

fn print_tables(input: &ModelArgs, plans: &[PlaybookPlan]) {
    if plans.is_empty() {
        println!("Model is empty. Nothing to plan.");
        return;
    }

    for plan in plans {
        println!(
            "{} {} → cluster {}",
            plan.component.0.bold(),
            plan.version,
            plan.cluster_id
        );
        let rows: Vec<PlanTableRow> = plan
            .descriptors
            .iter()
            .map(|d| PlanTableRow {
                kind: kind_label(d.kind),
                source: display_path(&plan.playbook_root, &d.src).to_string(),
                destination: display_path(&input.root, &d.dest).to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

fn print_json(input: &ModelArgs, plans: &[PlaybookPlan]) -> Result<()> {
    let payload: Vec<PlanJson> = plans
        .iter()
        .map(|plan| PlanJson {
            component: plan.component.0.clone(),
            version: plan.version.clone(),
            cluster_id: plan.cluster_id.0.clone(),
            output_root: display_path(&input.root, &plan.output_root).to_string(),
            files: plan
                .descriptors
                .iter()
                .map(|d| PlanFileJson {
                    kind: kind_label(d.kind),
                    source: display_path(&plan.playbook_root, &d.src).to_string(),
                    destination: display_path(&input.root, &d.dest).to_string(),
                })
                .collect(),
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}
