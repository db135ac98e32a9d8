//! `daybook chain`: inspect the merged day chain.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use daybook_sync::{pipeline, ChainEntry, ChangeFlags, SyncPlan};

use super::{OptionArgs, SiteArgs};

/// Arguments for `daybook chain`.
#[derive(Args, Debug)]
pub struct ChainArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ChainArgs {
    pub fn run(self) -> Result<()> {
        let options = self.site.options(&self.options)?;
        let store = self.site.store();
        let (old, new) = pipeline::load_file_sets(&store, &self.site.build)
            .context("failed to load file sets")?;
        let plan = pipeline::plan(&old, &new, &options).context("failed to classify chain")?;

        let rows = chain_rows(&plan);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize chain JSON")?
            );
            return Ok(());
        }

        print_table(rows);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ChainRow {
    day: String,
    old: Option<String>,
    new: Option<String>,
    prev: Option<String>,
    next: Option<String>,
    flags: ChangeFlags,
    publish: bool,
}

#[derive(Tabled)]
struct ChainTableRow {
    #[tabled(rename = "day")]
    day: String,
    #[tabled(rename = "old")]
    old: String,
    #[tabled(rename = "new")]
    new: String,
    #[tabled(rename = "prev")]
    prev: String,
    #[tabled(rename = "next")]
    next: String,
    #[tabled(rename = "flags")]
    flags: String,
    #[tabled(rename = "publish")]
    publish: String,
}

fn chain_rows(plan: &SyncPlan) -> Vec<ChainRow> {
    plan.chain
        .iter()
        .map(|item: &ChainEntry| {
            let e = &item.entry;
            let publish = item
                .authoritative()
                .is_some_and(|(file, _)| plan.updates.contains_key(file.key()));
            ChainRow {
                day: e.index.to_string(),
                old: e.old.as_ref().map(|f| f.key().to_string()),
                new: e.new.as_ref().map(|f| f.key().to_string()),
                prev: e.prev.map(|d| d.to_string()),
                next: e.next.map(|d| d.to_string()),
                flags: item.flags,
                publish,
            }
        })
        .collect()
}

fn flag_labels(flags: &ChangeFlags) -> String {
    let labels: Vec<&str> = [
        (flags.is_new, "new"),
        (flags.hash_changed, "hash"),
        (flags.pagination_changed_old, "links(old)"),
        (flags.pagination_changed_new, "links(new)"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect();
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

fn print_table(rows: Vec<ChainRow>) {
    if rows.is_empty() {
        println!("No dated pages found.");
        return;
    }

    let publish_count = rows.iter().filter(|r| r.publish).count();
    let dash = || "-".to_string();
    let table_rows: Vec<ChainTableRow> = rows
        .into_iter()
        .map(|row| ChainTableRow {
            flags: flag_labels(&row.flags),
            publish: if row.publish {
                "yes".green().to_string()
            } else {
                "no".bright_black().to_string()
            },
            day: row.day,
            old: if row.old.is_some() { "●" } else { "·" }.to_string(),
            new: if row.new.is_some() { "●" } else { "·" }.to_string(),
            prev: row.prev.unwrap_or_else(dash),
            next: row.next.unwrap_or_else(dash),
        })
        .collect();

    let total = table_rows.len();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{total} day(s), {publish_count} to publish");
}
