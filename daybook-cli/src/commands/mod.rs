//! Subcommands and the arguments they share.

pub mod chain;
pub mod diff;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use daybook_core::{config, DirectoryStore, ObjectStore, SyncOptions};

/// Where the build comes from and where it is published to.
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Directory holding the freshly generated site.
    #[arg(long, value_name = "DIR")]
    pub build: PathBuf,

    /// Directory holding the published site (document root or bucket mirror).
    #[arg(long, value_name = "DIR")]
    pub published: PathBuf,

    /// Config file to use instead of ./daybook.yaml or ~/.daybook/config.yaml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Per-run overrides of the config file.
#[derive(Args, Debug)]
pub struct OptionArgs {
    /// Republish every published file and skip pruning.
    #[arg(long)]
    pub force: bool,

    /// Check and repair pagination links embedded in pages.
    #[arg(long, value_name = "BOOL")]
    pub pagination: Option<bool>,

    /// Maximum concurrent file reads.
    #[arg(long, value_name = "N")]
    pub fan_out: Option<usize>,
}

impl SiteArgs {
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::new(DirectoryStore::new(&self.published))
    }

    /// Config-file options with `overrides` applied.
    pub fn options(&self, overrides: &OptionArgs) -> Result<SyncOptions> {
        let (mut options, source) =
            config::load(self.config.as_deref()).context("failed to load configuration")?;
        match source {
            Some(path) => tracing::debug!("using config {}", path.display()),
            None => tracing::debug!("using default options"),
        }

        options.force |= overrides.force;
        if let Some(enforce) = overrides.pagination {
            options.enforce_pagination = enforce;
        }
        if let Some(fan_out) = overrides.fan_out {
            options.fan_out = fan_out;
        }
        options.validate().context("invalid options")?;
        Ok(options)
    }
}
