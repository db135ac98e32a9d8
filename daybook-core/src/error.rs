//! Error types for daybook-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from file sets, stores, and configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with the path it happened at.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's content accessor failed; the key identifies the file.
    #[error("content unavailable for '{key}' ({locator}): {source}")]
    ContentUnavailable {
        key: String,
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// A storage key that cannot identify a file (empty, or a bare `/`).
    #[error("invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config value parsed but is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Directory walk failure while enumerating a build.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Convenience constructor for [`CoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
