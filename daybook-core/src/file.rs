//! Published files and their lazily resolved content.
//!
//! A [`PublishedFile`] pairs a storage key with a [`ContentSource`]. The
//! first call to [`PublishedFile::content`] or [`PublishedFile::hash`]
//! fetches the bytes and computes the SHA-256 digest; both are cached for the
//! lifetime of the file (and of every clone of it). The cache sits behind a
//! mutex, so concurrent callers still trigger exactly one fetch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::{normalize_storage_key, DayKey};

// ---------------------------------------------------------------------------
// Content sources
// ---------------------------------------------------------------------------

/// Where a file's bytes come from.
pub trait ContentSource: Send + Sync {
    /// Read the full payload.
    fn fetch(&self) -> std::io::Result<Vec<u8>>;

    /// Human-readable origin, used in error messages.
    fn locator(&self) -> String;
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    pub path: PathBuf,
}

impl ContentSource for LocalSource {
    fn fetch(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn locator(&self) -> String {
        self.path.display().to_string()
    }
}

/// Bytes that are already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource(pub Vec<u8>);

impl ContentSource for MemorySource {
    fn fetch(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn locator(&self) -> String {
        format!("memory ({} bytes)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// PublishedFile
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Resolved {
    bytes: Arc<[u8]>,
    hash: Arc<str>,
}

/// A page or asset in either the published (old) or freshly built (new) set.
#[derive(Clone)]
pub struct PublishedFile {
    key: String,
    source: Arc<dyn ContentSource>,
    cache: Arc<Mutex<Option<Resolved>>>,
}

impl PublishedFile {
    /// Build a file from any content source. The key is normalised with
    /// [`normalize_storage_key`].
    pub fn new(key: &str, source: Arc<dyn ContentSource>) -> Result<Self, CoreError> {
        Ok(Self {
            key: normalize_storage_key(key)?,
            source,
            cache: Arc::new(Mutex::new(None)),
        })
    }

    /// A file read from `path` on first access.
    pub fn local(key: &str, path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::new(
            key,
            Arc::new(LocalSource {
                path: path.as_ref().to_path_buf(),
            }),
        )
    }

    /// A file whose bytes are already known.
    pub fn from_bytes(key: &str, bytes: impl Into<Vec<u8>>) -> Result<Self, CoreError> {
        Self::new(key, Arc::new(MemorySource(bytes.into())))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn locator(&self) -> String {
        self.source.locator()
    }

    /// The pagination-chain day this file belongs to, if any.
    pub fn day(&self) -> Option<DayKey> {
        DayKey::from_storage_key(&self.key)
    }

    /// Whether the content has already been fetched.
    pub fn is_resolved(&self) -> bool {
        self.lock().is_some()
    }

    /// The file's bytes, fetched on first call.
    pub fn content(&self) -> Result<Arc<[u8]>, CoreError> {
        self.resolve().map(|r| r.bytes)
    }

    /// Lowercase hex SHA-256 of the content, computed on first call.
    pub fn hash(&self) -> Result<Arc<str>, CoreError> {
        self.resolve().map(|r| r.hash)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Resolved>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self) -> Result<Resolved, CoreError> {
        let mut cache = self.lock();
        if let Some(resolved) = cache.as_ref() {
            return Ok(resolved.clone());
        }

        let bytes = self
            .source
            .fetch()
            .map_err(|source| CoreError::ContentUnavailable {
                key: self.key.clone(),
                locator: self.source.locator(),
                source,
            })?;
        tracing::debug!("resolved {} ({} bytes)", self.key, bytes.len());

        let resolved = Resolved {
            hash: content_hash(&bytes).into(),
            bytes: bytes.into(),
        };
        *cache = Some(resolved.clone());
        Ok(resolved)
    }
}

impl fmt::Debug for PublishedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishedFile")
            .field("key", &self.key)
            .field("locator", &self.source.locator())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// SHA-256 of `bytes` as a lowercase hex string.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
