//! In-memory storage backend.

use std::{collections::HashMap, sync::RwLock};

use bytes::Bytes;

use super::StorageBackend;
use crate::error::{Error, Result};

/// An in-memory storage backend.
///
/// Serves ARFF text that never touched the disk, e.g. fixtures in tests or
/// data piped in by an embedding application.
///
/// # Example
///
/// ```
/// use arffsplit::backend::{MemoryBackend, StorageBackend};
/// use bytes::Bytes;
///
/// let backend = MemoryBackend::new();
/// backend.insert("toy.arff", Bytes::from("@data\n1\n")).unwrap();
/// assert_eq!(backend.get("toy.arff").unwrap().len(), 8);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Creates a new empty memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory backend with initial data.
    pub fn with_data(data: HashMap<String, Bytes>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Stores `data` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock was poisoned by a panicking
    /// writer.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) -> Result<()> {
        let mut store = self
            .data
            .write()
            .map_err(|_| Error::storage("Failed to acquire write lock"))?;
        store.insert(key.into(), data.into());
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Bytes> {
        let data = self
            .data
            .read()
            .map_err(|_| Error::storage("Failed to acquire read lock"))?;

        data.get(key)
            .cloned()
            .ok_or_else(|| Error::storage(format!("Key not found: {}", key)))
    }
}
