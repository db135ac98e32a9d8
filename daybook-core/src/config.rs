//! Sync configuration.
//!
//! # Lookup order
//!
//! ```text
//! --config <path>                 (explicit; must exist)
//! ./daybook.yaml                  (working directory)
//! ~/.daybook/config.yaml          (per-user)
//! built-in defaults
//! ```
//!
//! # API pattern
//!
//! - `load_at(home, cwd, explicit)`: explicit roots; used in tests with `TempDir`
//! - `load(explicit)`: derives home from `dirs::home_dir()` and cwd from the
//!   process, delegates to `load_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// File name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "daybook.yaml";

/// CSS selectors locating the pagination links inside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub prev: String,
    pub next: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            prev: "a.prev".to_string(),
            next: "a.next".to_string(),
        }
    }
}

/// Options for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Republish every old file and skip hash-based pruning.
    pub force: bool,
    /// Inspect embedded links and repair them against the chain.
    pub enforce_pagination: bool,
    /// Upper bound on concurrent content fetches / materializations.
    pub fan_out: usize,
    pub selectors: SelectorConfig,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            enforce_pagination: true,
            fan_out: 8,
            selectors: SelectorConfig::default(),
        }
    }
}

impl SyncOptions {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fan_out == 0 {
            return Err(CoreError::InvalidConfig(
                "fan_out must be at least 1".to_string(),
            ));
        }
        if self.selectors.prev.trim().is_empty() || self.selectors.next.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "pagination selectors must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<home>/.daybook/config.yaml`. Pure, no I/O.
pub fn user_config_path_at(home: &Path) -> PathBuf {
    home.join(".daybook").join("config.yaml")
}

/// Resolve and load options.
///
/// Returns the options plus the file they came from (`None` for defaults).
pub fn load_at(
    home: Option<&Path>,
    cwd: &Path,
    explicit: Option<&Path>,
) -> Result<(SyncOptions, Option<PathBuf>), CoreError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        return load_file(path).map(|options| (options, Some(path.to_path_buf())));
    }

    let candidates = std::iter::once(cwd.join(CONFIG_FILENAME))
        .chain(home.map(user_config_path_at));
    for path in candidates {
        if path.is_file() {
            let options = load_file(&path)?;
            return Ok((options, Some(path)));
        }
    }

    tracing::debug!("no config file found; using defaults");
    Ok((SyncOptions::default(), None))
}

/// `load_at` convenience wrapper.
pub fn load(explicit: Option<&Path>) -> Result<(SyncOptions, Option<PathBuf>), CoreError> {
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    let home = dirs::home_dir();
    load_at(home.as_deref(), &cwd, explicit)
}

/// Parse and validate a single config file.
pub fn load_file(path: &Path) -> Result<SyncOptions, CoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let options: SyncOptions = if contents.trim().is_empty() {
        SyncOptions::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    options.validate()?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = SyncOptions::default();
        assert!(!options.force);
        assert!(options.enforce_pagination);
        assert_eq!(options.fan_out, 8);
        assert_eq!(options.selectors.prev, "a.prev");
        assert_eq!(options.selectors.next, "a.next");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let options: SyncOptions =
            serde_yaml::from_str("selectors:\n  next: nav a[rel=next]\n").unwrap();
        assert_eq!(options.selectors.next, "nav a[rel=next]");
        assert_eq!(options.selectors.prev, "a.prev");
        assert!(options.enforce_pagination);
    }

    #[test]
    fn zero_fan_out_is_invalid() {
        let options = SyncOptions {
            fan_out: 0,
            ..SyncOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }
}
