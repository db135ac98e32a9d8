//! Building the day chain and classifying each position.

use serde::Serialize;

use daybook_core::{DayKey, PublishedFile};

use crate::error::SyncError;
use crate::merge::{merge_indexed, MergeEntry, Side};

/// Per-entry change flags.
///
/// `update == is_new || content_changed` and
/// `content_changed == hash_changed || pagination_changed` hold after every
/// pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeFlags {
    pub is_new: bool,
    pub hash_changed: bool,
    pub pagination_changed_old: bool,
    pub pagination_changed_new: bool,
    pub pagination_changed: bool,
    pub content_changed: bool,
    pub update: bool,
}

impl ChangeFlags {
    /// Record link drift found on `side` and cascade it. Only ever sets flags.
    pub fn mark_pagination_drift(&mut self, side: Side) {
        match side {
            Side::Old => self.pagination_changed_old = true,
            Side::New => self.pagination_changed_new = true,
        }
        self.pagination_changed = true;
        self.content_changed = true;
        self.update = true;
    }
}

/// One day of the merged chain together with its flags.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub entry: MergeEntry<DayKey, PublishedFile, PublishedFile>,
    pub flags: ChangeFlags,
}

impl ChainEntry {
    pub fn day(&self) -> DayKey {
        self.entry.index
    }

    /// The file whose content gets published for this day: the new one if
    /// present, else the old one.
    pub fn authoritative(&self) -> Option<(&PublishedFile, Side)> {
        match (&self.entry.new, &self.entry.old) {
            (Some(file), _) => Some((file, Side::New)),
            (None, Some(file)) => Some((file, Side::Old)),
            (None, None) => None,
        }
    }
}

/// Merge the chain-eligible files of both sets by day.
///
/// Files whose key has no day prefix are ignored here. Two files of one set
/// on the same day fail with [`SyncError::AmbiguousMergeInput`].
pub fn build_chain(
    old: &[PublishedFile],
    new: &[PublishedFile],
) -> Result<Vec<ChainEntry>, SyncError> {
    let merged = merge_indexed(by_day(old), by_day(new))?;
    Ok(merged
        .into_iter()
        .map(|entry| ChainEntry {
            entry,
            flags: ChangeFlags::default(),
        })
        .collect())
}

fn by_day(files: &[PublishedFile]) -> Vec<(DayKey, PublishedFile)> {
    let mut days: Vec<_> = files
        .iter()
        .filter_map(|file| file.day().map(|day| (day, file.clone())))
        .collect();
    // Stable, so a duplicate day stays adjacent and is reported by the merge.
    days.sort_by_key(|(day, _)| *day);
    days
}

/// Assign flags from hashes and neighbour positions.
///
/// Hashes must be resolvable; a failed fetch aborts with
/// [`SyncError::ContentUnavailable`].
pub fn classify(chain: &mut [ChainEntry]) -> Result<(), SyncError> {
    for item in chain.iter_mut() {
        let e = &item.entry;
        let flags = &mut item.flags;

        flags.is_new = e.old.is_none() && e.new.is_some();
        flags.hash_changed = match (&e.old, &e.new) {
            (Some(old), Some(new)) => old.hash()? != new.hash()?,
            _ => false,
        };
        flags.pagination_changed_old =
            e.old.is_some() && (e.prev_old != e.prev || e.next_old != e.next);
        flags.pagination_changed_new =
            e.new.is_some() && (e.prev_new != e.prev || e.next_new != e.next);

        // A changed page takes its links from the new side.
        flags.pagination_changed = flags.pagination_changed_new
            || (flags.pagination_changed_old && !flags.hash_changed);
        flags.content_changed = flags.hash_changed || flags.pagination_changed;
        flags.update = flags.is_new || flags.content_changed;

        tracing::debug!("classified {}: {:?}", e.index, flags);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
