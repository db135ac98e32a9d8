//! Daybook core library: domain types, file sets, stores, config, errors.
//!
//! Public API surface:
//! - [`types`]: [`DayKey`] and storage-key normalisation
//! - [`file`]: [`PublishedFile`] with lazily cached content and hash
//! - [`store`]: the [`ObjectStore`] seam and [`DirectoryStore`]
//! - [`walk`]: build-directory file-set provider
//! - [`config`]: [`SyncOptions`] loading
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod file;
pub mod store;
pub mod types;
pub mod walk;

pub use config::{SelectorConfig, SyncOptions};
pub use error::CoreError;
pub use file::{ContentSource, LocalSource, MemorySource, PublishedFile};
pub use store::{list_files, DirectoryStore, ObjectStore, StoreSource};
pub use types::DayKey;
pub use walk::walk_build_dir;
