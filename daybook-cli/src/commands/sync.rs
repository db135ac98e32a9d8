//! `daybook sync`: publish what changed between the build and the site.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use daybook_sync::{pipeline, SyncReport, WriteResult};

use super::{OptionArgs, SiteArgs};

/// Arguments for `daybook sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Show what would be published without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncJson<'a> {
    dry_run: bool,
    published: Vec<&'a str>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let options = self.site.options(&self.options)?;
        let report = pipeline::run(self.site.store(), &self.site.build, &options, self.dry_run)
            .with_context(|| format!("sync of '{}' failed", self.site.build.display()))?;

        if self.json {
            let payload = SyncJson {
                dry_run: report.dry_run,
                published: report.published_keys(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
            );
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    if report.writes.is_empty() {
        println!("{prefix}✓ nothing to publish");
        return;
    }

    println!(
        "{prefix}✓ published {} file(s) to {}",
        report.writes.len(),
        report.store
    );
    for write in &report.writes {
        match write {
            WriteResult::Written { key, bytes } => {
                println!("  ✎  {key} {}", format!("({bytes} bytes)").bright_black())
            }
            WriteResult::WouldWrite { key, bytes } => {
                println!("  ~  {key} {}", format!("({bytes} bytes)").bright_black())
            }
        }
    }
}
