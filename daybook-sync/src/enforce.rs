//! Content-based pagination check.
//!
//! Classification only compares neighbour *positions*. This pass reads the
//! links actually embedded in each authoritative page and flags the entry
//! when they do not point at the chain neighbours, which also catches
//! hand-edited links on otherwise unchanged pages.

use std::collections::BTreeSet;

use daybook_core::DayKey;

use crate::classify::ChainEntry;
use crate::error::SyncError;
use crate::pagination::{day_page_key, url_to_key, PaginationCodec};

/// Flag every entry whose embedded links disagree with the chain.
/// Returns how many entries drifted. Never clears a flag.
pub fn enforce_pagination(
    chain: &mut [ChainEntry],
    codec: &PaginationCodec,
) -> Result<usize, SyncError> {
    let mut flagged = 0;
    for item in chain.iter_mut() {
        let Some((file, side)) = item.authoritative() else {
            continue;
        };

        let content = file.content()?;
        let links = codec
            .extract(&content)
            .map_err(|source| SyncError::Markup {
                key: file.key().to_string(),
                source,
            })?;

        let prev_ok = links_match(&links.prev, item.entry.prev);
        let next_ok = links_match(&links.next, item.entry.next);
        if prev_ok && next_ok {
            continue;
        }

        tracing::debug!(
            "{}: embedded links {:?} do not match chain (prev {:?}, next {:?})",
            file.key(),
            links,
            item.entry.prev,
            item.entry.next
        );
        item.flags.mark_pagination_drift(side);
        flagged += 1;
    }
    Ok(flagged)
}

/// Whether the embedded links of one direction, normalised to keys and
/// deduplicated, are exactly the canonical neighbour (or nothing at a chain
/// end). Links that normalise to no key are ignored.
fn links_match(links: &[String], neighbour: Option<DayKey>) -> bool {
    let found: BTreeSet<String> = links.iter().filter_map(|href| url_to_key(href)).collect();
    let expected: BTreeSet<String> = neighbour.map(day_page_key).into_iter().collect();
    found == expected
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
