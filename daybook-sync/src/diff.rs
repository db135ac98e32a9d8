//! Dry-run unified diff support for `daybook diff`.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use similar::TextDiff;

use daybook_core::{ObjectStore, PublishedFile, SyncOptions};

use crate::error::SyncError;
use crate::materialize::UpdateMap;
use crate::pipeline::{load_file_sets, plan};

/// A single pending change, rendered as a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub key: String,
    pub unified_diff: String,
}

/// Diff every pending update against the published copy of the same key
/// (empty when the key is not published yet).
pub fn diff_updates(
    published: &[PublishedFile],
    updates: &UpdateMap,
) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::new();
    for (key, pending) in updates {
        let current = match published.iter().find(|file| file.key() == key) {
            Some(file) => file.content()?.to_vec(),
            None => Vec::new(),
        };
        if current == *pending {
            continue;
        }
        diffs.push(FileDiff {
            key: key.clone(),
            unified_diff: render(key, &current, pending),
        });
    }
    Ok(diffs)
}

/// Plan a sync of `build_dir` into `store` and diff the result. No files
/// are written.
pub fn diff_build(
    store: &Arc<dyn ObjectStore>,
    build_dir: &Path,
    options: &SyncOptions,
) -> Result<Vec<FileDiff>, SyncError> {
    let (old, new) = load_file_sets(store, build_dir)?;
    let plan = plan(&old, &new, options)?;
    diff_updates(&old, &plan.updates)
}

fn render(key: &str, current: &[u8], pending: &[u8]) -> String {
    let old_header = format!("a/{key}");
    let new_header = format!("b/{key}");
    let (Ok(current), Ok(pending)) = (std::str::from_utf8(current), std::str::from_utf8(pending))
    else {
        return format!("Binary files {old_header} and {new_header} differ\n");
    };

    let current = normalize_line_endings(current);
    let pending = normalize_line_endings(pending);
    TextDiff::from_lines(&current, &pending)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
