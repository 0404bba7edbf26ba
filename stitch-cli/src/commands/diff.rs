//! `stitch diff`: show unified diffs for what pull would write.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use stitch_sync::preview_pull;

use super::Context;

/// Arguments for `stitch diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let root = ctx.root()?;
        let mut remote = ctx.remote(&root)?;
        let result = preview_pull(&root, &mut remote, &ctx.scope).context("diff failed")?;

        for error in &result.errors {
            eprintln!("{} {}", "✗".red().bold(), error.message);
        }

        if result.diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
