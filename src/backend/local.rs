//! Local filesystem storage backend.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytes::Bytes;

use super::StorageBackend;
use crate::error::{Error, Result};

/// A storage backend using the local filesystem.
///
/// All keys are relative to the configured root directory.
///
/// # Example
///
/// ```no_run
/// use arffsplit::backend::{LocalBackend, StorageBackend};
///
/// let backend = LocalBackend::new("/data/nsl-kdd");
/// let bytes = backend.get("KDDTrain+.arff").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Creates a backend rooted at `root`. The directory is not touched
    /// until a key is read.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolves a key to a full filesystem path.
    fn resolve_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl StorageBackend for LocalBackend {
    fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.resolve_path(key);
        let data = fs::read(&path).map_err(|e| Error::io(e, &path))?;
        Ok(Bytes::from(data))
    }
}
