//! Error types for daybook-sync.

use thiserror::Error;

use daybook_core::CoreError;

use crate::merge::Side;

/// All errors that can arise from a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed input: unsorted merge sequences, empty keys, bad selectors.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The same key appears twice on one side of a merge.
    #[error("duplicate key '{key}' on the {side} side")]
    AmbiguousMergeInput { side: Side, key: String },

    /// A file's content could not be fetched; the run is aborted.
    #[error("content unavailable for '{key}': {source}")]
    ContentUnavailable {
        key: String,
        #[source]
        source: CoreError,
    },

    /// The HTML rewriter rejected a page.
    #[error("markup error in '{key}': {source}")]
    Markup {
        key: String,
        #[source]
        source: lol_html::errors::RewritingError,
    },

    /// The worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Any other error from daybook-core (stores, walks, config).
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        let key = match &err {
            CoreError::ContentUnavailable { key, .. } => Some(key.clone()),
            _ => None,
        };
        match key {
            Some(key) => SyncError::ContentUnavailable { key, source: err },
            None => SyncError::Core(err),
        }
    }
}
