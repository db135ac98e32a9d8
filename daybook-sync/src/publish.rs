//! Handing the update map to the object store.

use std::collections::BTreeMap;

use serde::Serialize;

use daybook_core::ObjectStore;

use crate::error::SyncError;

/// Outcome of publishing a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteResult {
    /// The object was stored.
    Written { key: String, bytes: usize },
    /// `--dry-run` mode: the object *would* have been stored.
    WouldWrite { key: String, bytes: usize },
}

impl WriteResult {
    pub fn key(&self) -> &str {
        match self {
            WriteResult::Written { key, .. } | WriteResult::WouldWrite { key, .. } => key,
        }
    }
}

/// Store every entry of `updates` in key order.
///
/// Stops at the first failed put; keys before it stay published.
pub fn publish(
    store: &dyn ObjectStore,
    updates: &BTreeMap<String, Vec<u8>>,
    dry_run: bool,
) -> Result<Vec<WriteResult>, SyncError> {
    let mut writes = Vec::with_capacity(updates.len());
    for (key, bytes) in updates {
        if dry_run {
            tracing::info!("[dry-run] would publish: {key}");
            writes.push(WriteResult::WouldWrite {
                key: key.clone(),
                bytes: bytes.len(),
            });
            continue;
        }

        store.put(key, bytes)?;
        tracing::info!("published: {key} ({} bytes)", bytes.len());
        writes.push(WriteResult::Written {
            key: key.clone(),
            bytes: bytes.len(),
        });
    }
    Ok(writes)
}
