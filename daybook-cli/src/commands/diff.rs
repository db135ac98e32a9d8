//! `daybook diff`: show unified diffs for what sync would publish.

use anyhow::{Context, Result};
use clap::Args;

use daybook_sync::diff_build;

use super::{OptionArgs, SiteArgs};

/// Arguments for `daybook diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(flatten)]
    pub options: OptionArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let options = self.site.options(&self.options)?;
        let diffs = diff_build(&self.site.store(), &self.site.build, &options)
            .with_context(|| format!("diff of '{}' failed", self.site.build.display()))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
