//! Producing the key -> bytes map to publish.
//!
//! ```text
//! force      every old file, verbatim
//! assets     new non-chain files that are new or whose hash changed
//! chain      authoritative file of every updated entry (every entry
//!            under force), links repaired when needed
//! prune      drop outputs byte-equal to the published file (not under force)
//! ```
//!
//! Per-entry work runs on the current rayon pool.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;

use daybook_core::{PublishedFile, SyncOptions};

use crate::classify::ChainEntry;
use crate::error::SyncError;
use crate::pagination::{day_url, PaginationCodec};

/// The files to publish, keyed by storage key.
pub type UpdateMap = BTreeMap<String, Vec<u8>>;

pub fn materialize(
    chain: &[ChainEntry],
    old: &[PublishedFile],
    new: &[PublishedFile],
    codec: &PaginationCodec,
    options: &SyncOptions,
) -> Result<UpdateMap, SyncError> {
    let published: HashMap<&str, &PublishedFile> =
        old.iter().map(|file| (file.key(), file)).collect();
    let mut updates = UpdateMap::new();

    if options.force {
        for file in old {
            updates.insert(file.key().to_string(), file.content()?.to_vec());
        }
    }

    let assets: Vec<(String, Vec<u8>)> = new
        .par_iter()
        .filter(|file| file.day().is_none())
        .map(|file| asset_update(file, published.get(file.key()).copied(), options.force))
        .filter_map(Result::transpose)
        .collect::<Result<_, _>>()?;
    updates.extend(assets);

    let pages: Vec<(String, Vec<u8>)> = chain
        .par_iter()
        .filter(|item| options.force || item.flags.update)
        .map(|item| page_update(item, codec, options))
        .filter_map(Result::transpose)
        .collect::<Result<_, _>>()?;
    updates.extend(pages);

    if !options.force {
        prune_unchanged(&mut updates, &published)?;
    }
    Ok(updates)
}

fn asset_update(
    file: &PublishedFile,
    published: Option<&PublishedFile>,
    force: bool,
) -> Result<Option<(String, Vec<u8>)>, SyncError> {
    if let Some(old) = published {
        if !force && old.hash()? == file.hash()? {
            return Ok(None);
        }
    }
    Ok(Some((file.key().to_string(), file.content()?.to_vec())))
}

fn page_update(
    item: &ChainEntry,
    codec: &PaginationCodec,
    options: &SyncOptions,
) -> Result<Option<(String, Vec<u8>)>, SyncError> {
    let Some((file, _)) = item.authoritative() else {
        return Ok(None);
    };
    let content = file.content()?;

    if !(options.enforce_pagination || item.flags.pagination_changed) {
        return Ok(Some((file.key().to_string(), content.to_vec())));
    }

    let prev = item.entry.prev.map(day_url);
    let next = item.entry.next.map(day_url);
    let repaired = codec
        .rewrite(&content, prev.as_deref(), next.as_deref())
        .map_err(|source| SyncError::Markup {
            key: file.key().to_string(),
            source,
        })?;
    if matches!(repaired, Cow::Owned(_)) {
        tracing::debug!("{}: pagination links rewritten", file.key());
    }
    Ok(Some((file.key().to_string(), repaired.into_owned())))
}

fn prune_unchanged(
    updates: &mut UpdateMap,
    published: &HashMap<&str, &PublishedFile>,
) -> Result<(), SyncError> {
    let mut unchanged = Vec::new();
    for (key, bytes) in updates.iter() {
        if let Some(old) = published.get(key.as_str()) {
            if *old.content()? == bytes[..] {
                unchanged.push(key.clone());
            }
        }
    }
    for key in unchanged {
        tracing::debug!("{key}: identical to published copy, skipped");
        updates.remove(&key);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
