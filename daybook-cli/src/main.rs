//! Daybook: incremental publisher for date-paginated static sites.
//!
//! # Usage
//!
//! ```text
//! daybook sync  --build <dir> --published <dir> [--force] [--pagination <bool>] [--fan-out <n>] [--dry-run] [--json]
//! daybook diff  --build <dir> --published <dir>
//! daybook chain --build <dir> --published <dir> [--json]
//! ```
//!
//! Every command also takes `--config <path>` and `-v`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{chain::ChainArgs, diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "daybook",
    version,
    about = "Publish a date-paginated static site incrementally",
    long_about = None,
)]
struct Cli {
    /// Log engine decisions to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish the files of a build that differ from the published site.
    Sync(SyncArgs),

    /// Show unified diffs of what sync would publish.
    Diff(DiffArgs),

    /// Show the merged day chain and how each day was classified.
    Chain(ChainArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Chain(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
