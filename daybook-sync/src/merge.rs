//! Sorted merge of two keyed sequences into one linked chain.
//!
//! Given the old and new key sequences (each ascending, duplicate-free), the
//! merge produces one [`MergeEntry`] per key of the union. Entries are linked
//! by key, not by reference:
//!
//! - `prev` / `next`: neighbours in the combined chain;
//! - `prev_old` / `next_old`: nearest neighbours that exist on the old side;
//! - `prev_new` / `next_new`: nearest neighbours that exist on the new side.
//!
//! ```text
//! old:      1  2  3
//! new:   0     2  3  4
//! chain: 0  1  2  3  4      2.prev = 1, 2.prev_old = 1, 2.prev_new = 0
//! ```
//!
//! Equal keys always collapse into a single entry carrying both values.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::SyncError;

/// Which file set a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The already-published set.
    Old,
    /// The freshly built set.
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => write!(f, "old"),
            Side::New => write!(f, "new"),
        }
    }
}

/// One position in the merged chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeEntry<K, A, B> {
    pub index: K,
    pub old: Option<A>,
    pub new: Option<B>,
    pub prev: Option<K>,
    pub next: Option<K>,
    pub prev_old: Option<K>,
    pub next_old: Option<K>,
    pub prev_new: Option<K>,
    pub next_new: Option<K>,
}

impl<K, A, B> MergeEntry<K, A, B> {
    fn empty(index: K, prev: Option<K>) -> Self {
        Self {
            index,
            old: None,
            new: None,
            prev,
            next: None,
            prev_old: None,
            next_old: None,
            prev_new: None,
            next_new: None,
        }
    }
}

/// Merge two ascending, duplicate-free keyed sequences.
///
/// Fails with [`SyncError::InvalidArgument`] when a side is not sorted and
/// with [`SyncError::AmbiguousMergeInput`] when a side repeats a key.
pub fn merge_indexed<K, A, B>(
    old: Vec<(K, A)>,
    new: Vec<(K, B)>,
) -> Result<Vec<MergeEntry<K, A, B>>, SyncError>
where
    K: Ord + Clone + fmt::Display,
{
    check_sorted(old.iter().map(|(k, _)| k), Side::Old)?;
    check_sorted(new.iter().map(|(k, _)| k), Side::New)?;

    let mut merged: Vec<MergeEntry<K, A, B>> = Vec::with_capacity(old.len().max(new.len()));
    let mut last_merge: Option<usize> = None;
    let mut last_old: Option<usize> = None;
    let mut last_new: Option<usize> = None;

    let mut old = old.into_iter().peekable();
    let mut new = new.into_iter().peekable();

    loop {
        // An exhausted side compares as larger than any key.
        let order = match (old.peek(), new.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((a, _)), Some((b, _))) => a.cmp(b),
        };

        let (index, a, b) = match order {
            Ordering::Equal => match (old.next(), new.next()) {
                (Some((k, a)), Some((_, b))) => (k, Some(a), Some(b)),
                _ => break,
            },
            Ordering::Less => match old.next() {
                Some((k, a)) => (k, Some(a), None),
                None => break,
            },
            Ordering::Greater => match new.next() {
                Some((k, b)) => (k, None, Some(b)),
                None => break,
            },
        };

        let position = merged.len();
        let prev = last_merge.map(|i| merged[i].index.clone());
        let mut entry = MergeEntry::empty(index.clone(), prev);

        if a.is_some() {
            if let Some(i) = last_old {
                entry.prev_old = Some(merged[i].index.clone());
                merged[i].next_old = Some(index.clone());
            }
            last_old = Some(position);
        }
        if b.is_some() {
            if let Some(i) = last_new {
                entry.prev_new = Some(merged[i].index.clone());
                merged[i].next_new = Some(index.clone());
            }
            last_new = Some(position);
        }
        if let Some(i) = last_merge {
            merged[i].next = Some(index);
        }

        entry.old = a;
        entry.new = b;
        merged.push(entry);
        last_merge = Some(position);
    }

    Ok(merged)
}

/// [`merge_indexed`] where each key is its own value.
pub fn merge_keys<K>(old: &[K], new: &[K]) -> Result<Vec<MergeEntry<K, K, K>>, SyncError>
where
    K: Ord + Clone + fmt::Display,
{
    merge_indexed(
        old.iter().map(|k| (k.clone(), k.clone())).collect(),
        new.iter().map(|k| (k.clone(), k.clone())).collect(),
    )
}

fn check_sorted<'a, K>(mut keys: impl Iterator<Item = &'a K>, side: Side) -> Result<(), SyncError>
where
    K: Ord + fmt::Display + 'a,
{
    let Some(mut last) = keys.next() else {
        return Ok(());
    };
    for key in keys {
        match last.cmp(key) {
            Ordering::Less => {}
            Ordering::Equal => {
                return Err(SyncError::AmbiguousMergeInput {
                    side,
                    key: key.to_string(),
                })
            }
            Ordering::Greater => {
                return Err(SyncError::InvalidArgument(format!(
                    "{side} keys are not sorted: '{last}' precedes '{key}'"
                )))
            }
        }
        last = key;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
