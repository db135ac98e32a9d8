//! Build-directory file-set provider.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, CoreError};
use crate::file::PublishedFile;

/// Suffix of in-flight writes; never part of a file set.
pub const TMP_SUFFIX: &str = ".daybook.tmp";

/// Walk a freshly generated site and return one [`PublishedFile`] per
/// regular file, keyed by its `/`-separated path relative to `root` and
/// sorted by key. Content is read lazily.
pub fn walk_build_dir(root: &Path) -> Result<Vec<PublishedFile>, CoreError> {
    if !root.is_dir() {
        return Err(io_err(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "build directory not found"),
        ));
    }
    collect_keys(root)?
        .into_iter()
        .map(|(key, path)| PublishedFile::local(&key, path))
        .collect()
}

/// `(key, absolute path)` for every regular file under `root`, sorted by key.
pub(crate) fn collect_keys(root: &Path) -> Result<Vec<(String, PathBuf)>, CoreError> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key.ends_with(TMP_SUFFIX) {
            continue;
        }
        keys.push((key, path.to_path_buf()));
    }
    keys.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keys)
}
