//! Storage backends for arffsplit.
//!
//! Backends fetch the raw bytes of a dataset file. The [`StorageBackend`]
//! trait defines the interface, with implementations for the local
//! filesystem, HTTP(S) servers, and in-memory buffers.

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "local")]
pub mod local;
pub mod memory;

use bytes::Bytes;
#[cfg(feature = "http")]
pub use http::HttpBackend;
#[cfg(feature = "local")]
pub use local::LocalBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// A read-only store of dataset files.
///
/// Keys are relative to the backend root: a directory for
/// [`LocalBackend`], a base URL for [`HttpBackend`].
pub trait StorageBackend: Send + Sync {
    /// Reads data from the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or cannot be read.
    fn get(&self, key: &str) -> Result<Bytes>;
}
