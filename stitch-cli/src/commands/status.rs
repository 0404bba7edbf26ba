//! `stitch status`: what changed locally since the last sync.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use stitch_sync::{changes::AreaPaths, ChangeReport, HashCache};

use super::Context;

/// Arguments for `stitch status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    #[serde(flatten)]
    report: &'a ChangeReport,
    last_sync_at: Option<String>,
    last_sync_age: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "area")]
    area: String,
    #[tabled(rename = "path")]
    path: String,
}

impl StatusArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let root = ctx.root()?;
        let config = ctx.config(&root)?;
        let cache = HashCache::open(&root, &ctx.scope);
        let report = cache.get_changes(&root);
        let synced_at = cache.synced_at();

        if self.json {
            let payload = StatusJson {
                report: &report,
                last_sync_at: synced_at.map(|t| t.to_rfc3339()),
                last_sync_age: last_sync_age(synced_at),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "stitch v{} | {} | last sync: {}",
            env!("CARGO_PKG_VERSION"),
            config.name.bold(),
            last_sync_age(synced_at),
        );

        if report.is_empty() {
            println!("{} No local changes.", "✓".green().bold());
            return Ok(());
        }

        let mut rows = Vec::new();
        push_rows(&mut rows, "changed", &report.changed);
        push_rows(&mut rows, "new", &report.new);
        push_rows(&mut rows, "deleted", &report.deleted);
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        println!(
            "{} changed, {} new, {} deleted",
            report.total.changed.to_string().yellow().bold(),
            report.total.new.to_string().green().bold(),
            report.total.deleted.to_string().red().bold(),
        );
        if report.total.changed + report.total.new > 0 {
            println!("Run 'stitch push' to send local changes.");
        }
        Ok(())
    }
}

fn push_rows(rows: &mut Vec<ChangeRow>, state: &str, bucket: &AreaPaths) {
    for (area, paths) in bucket {
        for path in paths {
            rows.push(ChangeRow {
                state: state.to_string(),
                area: area.to_string(),
                path: path.clone(),
            });
        }
    }
}

fn last_sync_age(synced_at: Option<DateTime<Utc>>) -> String {
    match synced_at {
        Some(at) => {
            let seconds = Utc::now().signed_duration_since(at).num_seconds().max(0) as u64;
            format!("{} ago", format_seconds(seconds))
        }
        None => "never".to_string(),
    }
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_are_coarse() {
        assert_eq!(format_seconds(5), "5s");
        assert_eq!(format_seconds(65), "1m");
        assert_eq!(format_seconds(2 * 60 * 60 + 1), "2h");
        assert_eq!(format_seconds(3 * 24 * 60 * 60), "3d");
        assert_eq!(last_sync_age(None), "never");
    }
}
