//! stitch: sync platform customizations with a local file tree.
//!
//! # Usage
//!
//! ```text
//! stitch init [PATH] --name <name> --base-url <url>
//! stitch pull [--dry-run]
//! stitch push [--all]
//! stitch status [--json]
//! stitch diff
//! stitch cache clear
//! ```
//!
//! Global: `-C/--project <dir>` picks where root discovery starts; `-v`/`-vv`
//! raise the log level (`RUST_LOG` overrides both).

mod commands;
mod http;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    cache::CacheCommand, diff::DiffArgs, init::InitArgs, pull::PullArgs, push::PushArgs,
    status::StatusArgs, Context,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stitch",
    version,
    about = "Sync platform customizations between the remote API and local files",
    long_about = None,
)]
struct Cli {
    /// Directory to start project discovery from (default: current directory).
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create `.stitch/config.yaml` and an empty hash cache.
    Init(InitArgs),

    /// Fetch every customization from the remote and write changed files.
    Pull(PullArgs),

    /// Send local changes (or everything with --all) to the remote.
    Push(PushArgs),

    /// Show changed, new and deleted files since the last sync.
    Status(StatusArgs),

    /// Show unified diffs of what pull would write.
    Diff(DiffArgs),

    /// Manage the local hash cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.project);
    match cli.command {
        Commands::Init(args) => args.run(&ctx),
        Commands::Pull(args) => args.run(&ctx),
        Commands::Push(args) => args.run(&ctx),
        Commands::Status(args) => args.run(&ctx),
        Commands::Diff(args) => args.run(&ctx),
        Commands::Cache { command } => commands::cache::run(command, &ctx),
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
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .try_init();
}
