//! Object-store seam and the directory-backed store.
//!
//! The engine reads the already-published file set through
//! [`ObjectStore::list_keys`] / [`ObjectStore::get`] and publishes through
//! [`ObjectStore::put`]. [`DirectoryStore`] implements the seam over a local
//! directory (a document root, or a mirror of a remote bucket).
//!
//! ## `DirectoryStore::put`: atomic write
//!
//! 1. Create parent directories.
//! 2. Write to `<path>.daybook.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//! 4. On rename failure, remove the `.tmp` file and report the error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{io_err, CoreError};
use crate::file::{ContentSource, PublishedFile};
use crate::types::normalize_storage_key;
use crate::walk::{collect_keys, TMP_SUFFIX};

/// A keyed byte store holding the published site.
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Short description for logs and CLI output.
    fn describe(&self) -> String;

    /// Every stored key, sorted.
    fn list_keys(&self) -> Result<Vec<String>, CoreError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, CoreError>;

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError>;
}

/// List `store` as a file set. Content is fetched from the store on demand.
pub fn list_files(store: &Arc<dyn ObjectStore>) -> Result<Vec<PublishedFile>, CoreError> {
    store
        .list_keys()?
        .into_iter()
        .map(|key| {
            let source = StoreSource {
                store: Arc::clone(store),
                key: key.clone(),
            };
            PublishedFile::new(&key, Arc::new(source))
        })
        .collect()
}

/// Content held by an [`ObjectStore`].
#[derive(Debug)]
pub struct StoreSource {
    pub store: Arc<dyn ObjectStore>,
    pub key: String,
}

impl ContentSource for StoreSource {
    fn fetch(&self) -> std::io::Result<Vec<u8>> {
        self.store.get(&self.key).map_err(|e| match e {
            CoreError::Io { source, .. } => source,
            other => std::io::Error::other(other),
        })
    }

    fn locator(&self) -> String {
        format!("{}:{}", self.store.describe(), self.key)
    }
}

// ---------------------------------------------------------------------------
// DirectoryStore
// ---------------------------------------------------------------------------

/// An [`ObjectStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        let key = normalize_storage_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }
}

impl ObjectStore for DirectoryStore {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        Ok(collect_keys(&self.root)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, CoreError> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| io_err(&path, e))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()));
        write_atomic(&path, &tmp, bytes)
    }
}

fn write_atomic(path: &Path, tmp: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("stored: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_root_lists_empty() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path().join("public"));
        assert!(store.list_keys().unwrap().is_empty());
    }

    #[test]
    fn put_creates_parents_and_lists_back() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());
        store.put("2023-11-01/index.html", b"day one").unwrap();
        store.put("/index.html", b"home").unwrap();

        assert_eq!(
            store.list_keys().unwrap(),
            ["2023-11-01/index.html", "index.html"]
        );
        assert_eq!(store.get("2023-11-01/index.html").unwrap(), b"day one");
    }

    #[test]
    fn put_leaves_no_tmp_file() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());
        store.put("a.html", b"a").unwrap();
        let tmp_path = tmp.path().join("a.html.daybook.tmp");
        assert!(!tmp_path.exists(), ".daybook.tmp must be cleaned up");
    }

    #[test]
    fn list_files_fetches_lazily_from_store() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.html"), "v1").unwrap();
        let store: Arc<dyn ObjectStore> = Arc::new(DirectoryStore::new(tmp.path()));

        let files = list_files(&store).unwrap();
        assert_eq!(files.len(), 1);
        assert!(!files[0].is_resolved());
        assert_eq!(&*files[0].content().unwrap(), b"v1");
        assert!(files[0].locator().ends_with(":a.html"));
    }

    #[test]
    fn get_missing_key_fails_with_path() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());
        let err = store.get("nope.html").unwrap_err();
        assert!(err.to_string().contains("nope.html"));
    }

    #[test]
    fn rejects_keys_escaping_root() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path());
        assert!(store.put("../outside.html", b"x").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("file.html");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.html.daybook.tmp");
        let result = write_atomic(&path, &tmp_path, b"new content");

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root can bypass the read-only bit; only assert on failure.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".daybook.tmp should be cleaned up");
        }
    }
}
