//! # daybook-sync
//!
//! Incremental synchronization of a date-paginated static site.
//!
//! Given the already-published file set and a fresh build, [`plan`] merges
//! the day pages of both into one chain, classifies every day, checks the
//! prev/next links embedded in each page, and returns the minimal key -> bytes
//! map to publish with pagination links repaired. [`run`] wires this to an
//! [`ObjectStore`](daybook_core::ObjectStore) and a build directory.

pub mod classify;
pub mod diff;
pub mod enforce;
pub mod error;
pub mod materialize;
pub mod merge;
pub mod pagination;
pub mod pipeline;
pub mod publish;

pub use classify::{build_chain, classify, ChainEntry, ChangeFlags};
pub use diff::{diff_build, diff_updates, FileDiff};
pub use enforce::enforce_pagination;
pub use error::SyncError;
pub use materialize::{materialize, UpdateMap};
pub use merge::{merge_indexed, merge_keys, MergeEntry, Side};
pub use pagination::{key_to_url, url_to_key, Pagination, PaginationCodec};
pub use pipeline::{increment_between_builds, plan, run, SyncPlan, SyncReport};
pub use publish::{publish, WriteResult};
