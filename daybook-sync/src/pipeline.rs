//! Run entry points shared by every CLI command.
//!
//! ```text
//! old (store listing) ─┐
//!                      ├─ build_chain ─ prefetch ─ classify ─ enforce ─ materialize ─ publish
//! new (build walk) ────┘
//! ```
//!
//! Content fetches and per-entry materialization run on a rayon pool of
//! `fan_out` threads built for the run. Merge and classification stay
//! sequential.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use daybook_core::{list_files, walk_build_dir, ObjectStore, PublishedFile, SyncOptions};

use crate::classify::{build_chain, classify, ChainEntry};
use crate::enforce::enforce_pagination;
use crate::error::SyncError;
use crate::materialize::{materialize, UpdateMap};
use crate::pagination::PaginationCodec;
use crate::publish::{publish, WriteResult};

/// The classified chain and the update map derived from it.
#[derive(Debug)]
pub struct SyncPlan {
    pub chain: Vec<ChainEntry>,
    pub updates: UpdateMap,
}

/// Classify `old` against `new` and compute what to publish.
///
/// Nothing is written. The first content fetch that fails aborts the plan.
pub fn plan(
    old: &[PublishedFile],
    new: &[PublishedFile],
    options: &SyncOptions,
) -> Result<SyncPlan, SyncError> {
    options.validate()?;
    let codec = PaginationCodec::from_config(&options.selectors)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.fan_out)
        .build()?;

    let mut chain = build_chain(old, new)?;
    tracing::debug!(
        "chain of {} day(s) from {} old / {} new file(s)",
        chain.len(),
        old.len(),
        new.len()
    );

    pool.install(|| prefetch(&chain, old, new, options))?;

    classify(&mut chain)?;
    if options.enforce_pagination {
        let drifted = enforce_pagination(&mut chain, &codec)?;
        tracing::debug!("{drifted} page(s) with drifted pagination links");
    }

    let updates = pool.install(|| materialize(&chain, old, new, &codec, options))?;
    Ok(SyncPlan { chain, updates })
}

/// [`plan`], keeping only the update map.
pub fn increment_between_builds(
    old: &[PublishedFile],
    new: &[PublishedFile],
    options: &SyncOptions,
) -> Result<UpdateMap, SyncError> {
    plan(old, new, options).map(|plan| plan.updates)
}

/// Resolve, in parallel, the content of every file the later passes read.
fn prefetch(
    chain: &[ChainEntry],
    old: &[PublishedFile],
    new: &[PublishedFile],
    options: &SyncOptions,
) -> Result<(), SyncError> {
    let new_keys: std::collections::HashSet<&str> = new.iter().map(PublishedFile::key).collect();

    let mut needed: Vec<&PublishedFile> = chain
        .iter()
        .flat_map(|item| item.entry.old.iter().chain(item.entry.new.iter()))
        .collect();
    needed.extend(new.iter().filter(|file| file.day().is_none()));
    needed.extend(old.iter().filter(|file| {
        file.day().is_none() && (options.force || new_keys.contains(file.key()))
    }));
    if options.force {
        needed.extend(old.iter().filter(|file| file.day().is_some()));
    }

    tracing::debug!("prefetching {} file(s)", needed.len());
    needed
        .par_iter()
        .try_for_each(|file| file.hash().map(drop))
        .map_err(SyncError::from)
}

/// The outcome of [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Description of the target store.
    pub store: String,
    pub dry_run: bool,
    pub writes: Vec<WriteResult>,
}

impl SyncReport {
    /// Keys that were (or would be) published, for a downstream cache
    /// invalidation.
    pub fn published_keys(&self) -> Vec<&str> {
        self.writes.iter().map(WriteResult::key).collect()
    }
}

/// The published set (`store`) and the freshly built set (`build_dir`).
pub fn load_file_sets(
    store: &Arc<dyn ObjectStore>,
    build_dir: &Path,
) -> Result<(Vec<PublishedFile>, Vec<PublishedFile>), SyncError> {
    let old = list_files(store)?;
    let new = walk_build_dir(build_dir)?;
    tracing::info!(
        "{} published file(s) in {}, {} built file(s) in {}",
        old.len(),
        store.describe(),
        new.len(),
        build_dir.display()
    );
    Ok((old, new))
}

/// Sync a build directory into a store: list, plan, publish.
pub fn run(
    store: Arc<dyn ObjectStore>,
    build_dir: &Path,
    options: &SyncOptions,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    let (old, new) = load_file_sets(&store, build_dir)?;
    let plan = plan(&old, &new, options)?;
    let writes = publish(store.as_ref(), &plan.updates, dry_run)?;

    Ok(SyncReport {
        store: store.describe(),
        dry_run,
        writes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::ContentSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted {
        bytes: &'static str,
        fetches: Arc<AtomicUsize>,
    }

    impl ContentSource for Counted {
        fn fetch(&self) -> std::io::Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes.as_bytes().to_vec())
        }

        fn locator(&self) -> String {
            "counted".to_string()
        }
    }

    fn counted(key: &str, bytes: &'static str, fetches: &Arc<AtomicUsize>) -> PublishedFile {
        let source = Counted {
            bytes,
            fetches: Arc::clone(fetches),
        };
        PublishedFile::new(key, Arc::new(source)).unwrap()
    }

    #[test]
    fn each_file_is_fetched_once_per_run() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let old = [
            counted("2023-11-01/index.html", "<a class=\"next\" href=\"/2023-11-02/\">", &fetches),
            counted("css/site.css", "body{}", &fetches),
        ];
        let new = [
            counted("2023-11-01/index.html", "<a class=\"next\" href=\"/2023-11-02/\">", &fetches),
            counted("2023-11-02/index.html", "<a class=\"prev\" href=\"/2023-11-01/\">", &fetches),
            counted("css/site.css", "body{ }", &fetches),
        ];

        let plan = plan(&old, &new, &SyncOptions::default()).unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 5);
        let keys: Vec<_> = plan.updates.keys().map(String::as_str).collect();
        assert_eq!(keys, ["2023-11-02/index.html", "css/site.css"]);
    }

    #[test]
    fn unrelated_old_assets_are_never_fetched() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let old = [counted("archive/2019.zip", "zip", &fetches)];
        let updates = increment_between_builds(&old, &[], &SyncOptions::default()).unwrap();
        assert!(updates.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_options_fail_before_any_fetch() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let new = [counted("index.html", "home", &fetches)];
        let options = SyncOptions {
            fan_out: 0,
            ..SyncOptions::default()
        };
        let err = plan(&[], &new, &options).unwrap_err();
        assert!(matches!(err, SyncError::Core(_)), "got: {err}");
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bad_selector_is_invalid_argument() {
        let mut options = SyncOptions::default();
        options.selectors.next = "a[".to_string();
        let err = plan(&[], &[], &options).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument(_)), "got: {err}");
    }
}
