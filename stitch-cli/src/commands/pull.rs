//! `stitch pull`: fetch every customization and write what changed.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use stitch_sync::{pull, PullOptions, PullResult, RunStatus, WriteResult};

use super::{finish, Context};

/// Arguments for `stitch pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Show what would be written without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "items")]
    items: usize,
    #[tabled(rename = "written")]
    written: usize,
    #[tabled(rename = "unchanged")]
    unchanged: usize,
    #[tabled(rename = "errors")]
    errors: usize,
}

impl PullArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let root = ctx.root()?;
        let mut remote = ctx.remote(&root)?;
        let options = PullOptions {
            dry_run: self.dry_run,
        };
        let result = pull(&root, &mut remote, options, &ctx.scope).context("pull failed")?;
        print_result(&result);
        finish(result.status(), "pull")
    }
}

fn print_result(result: &PullResult) {
    let prefix = if result.dry_run { "[dry-run] " } else { "" };

    for category in &result.categories {
        for write in &category.writes {
            match write {
                WriteResult::Written { path } => println!("  ✎  {}", path.display()),
                WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
                WriteResult::Unchanged { .. } => {}
            }
        }
    }

    let rows: Vec<CategoryRow> = result
        .categories
        .iter()
        .map(|c| CategoryRow {
            category: c.kind.category_label().to_string(),
            items: c.count,
            written: c.written,
            unchanged: c.unchanged,
            errors: c.errors.len(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for category in &result.categories {
        for error in &category.errors {
            println!("  {} {}", "✗".red().bold(), error.message);
        }
    }

    match result.status() {
        RunStatus::NothingToDo => println!("{prefix}✓ Everything up to date"),
        RunStatus::Complete => println!(
            "{prefix}{} Pulled ({} written, {} unchanged)",
            "✓".green().bold(),
            result.written(),
            result.unchanged()
        ),
        RunStatus::Partial => println!(
            "{prefix}{} Pulled with {} error(s)",
            "!".yellow().bold(),
            result.error_count()
        ),
    }
}
