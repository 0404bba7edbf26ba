//! `stitch push`: send local changes to the remote.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use stitch_sync::{push, PushMode, PushResult, RunStatus};

use super::{finish, Context};

/// Arguments for `stitch push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Push every tracked file, not just changed and new ones.
    #[arg(long)]
    pub all: bool,
}

impl PushArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let root = ctx.root()?;
        let mode = if self.all {
            PushMode::All
        } else {
            PushMode::Changed
        };

        // Skip building a client when there is provably nothing to send.
        if mode == PushMode::Changed {
            let cache = stitch_sync::HashCache::open(&root, &ctx.scope);
            if cache.get_changes(&root).pending().is_empty() {
                println!("✓ Nothing to push");
                return Ok(());
            }
        }

        let mut remote = ctx.remote(&root)?;
        let result = push(&root, &mut remote, mode, &ctx.scope);
        print_result(&result);
        finish(result.status(), "push")
    }
}

fn print_result(result: &PushResult) {
    for path in &result.pushed {
        println!("  {}  {path}", "↑".green());
    }
    for failure in &result.errors {
        println!(
            "  {} {} ({}): {}",
            "✗".red().bold(),
            failure.file,
            failure.kind,
            failure.message
        );
    }

    match result.status() {
        RunStatus::NothingToDo => println!("✓ Nothing to push"),
        RunStatus::Complete => println!(
            "{} Pushed {} file(s), {} up to date",
            "✓".green().bold(),
            result.pushed.len(),
            result.skipped.len()
        ),
        RunStatus::Partial => println!(
            "{} Pushed {} file(s), {} item(s) failed",
            "!".yellow().bold(),
            result.pushed.len(),
            result.errors.len()
        ),
    }
}
