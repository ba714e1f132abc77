//! Pagoda: deployment artifact generator.
//!
//! # Usage
//!
//! ```text
//! pagoda generate --model <file> [--root <dir>] [--dry-run]
//! pagoda plan     --model <file> [--root <dir>] [--json]
//! pagoda diff     --model <file> [--root <dir>]
//! ```
//!
//! `--root` falls back to `$PAGODA_ROOT`, then the current directory.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, generate::GenerateArgs, plan::PlanArgs};

#[derive(Parser, Debug)]
#[command(
    name = "pagoda",
    version,
    about = "Render per-cluster Ansible inventories and group vars from a deployment model",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render and write cluster artifacts for every component in the model.
    Generate(GenerateArgs),

    /// Show which files generation would write, and where.
    Plan(PlanArgs),

    /// Show unified diff of what generation would change on disk.
    Diff(DiffArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
