//! HTTP/HTTPS storage backend (read-only).
//!
//! Fetches dataset files hosted on web servers, e.g. raw GitHub content.

use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;
use tracing::debug;

use super::StorageBackend;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("arffsplit/", env!("CARGO_PKG_VERSION"));

/// A read-only storage backend using HTTP/HTTPS.
///
/// Keys are appended to the base URL.
///
/// # Example
///
/// ```no_run
/// use arffsplit::backend::{HttpBackend, StorageBackend};
///
/// let backend =
///     HttpBackend::with_timeout("https://raw.githubusercontent.com/owner/repo/main/data", 15)
///         .unwrap();
/// let data = backend.get("KDDTrain.arff").unwrap();
/// ```
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new HTTP backend with a request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for all requests
    /// * `timeout_secs` - Request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::storage(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Constructs the full URL for a key.
    fn url_for(&self, key: &str) -> String {
        if self.base_url.is_empty() {
            key.to_string()
        } else if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }
}

impl StorageBackend for HttpBackend {
    fn get(&self, key: &str) -> Result<Bytes> {
        let url = self.url_for(key);
        debug!(%url, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::storage(format!("HTTP GET error for '{}': {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::storage(format!(
                "HTTP GET failed for '{}': status {}",
                url,
                response.status()
            )));
        }

        response
            .bytes()
            .map_err(|e| Error::storage(format!("Failed to read HTTP response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::with_timeout(base, 5)
            .ok()
            .unwrap_or_else(|| panic!("Should create backend"))
    }

    #[test]
    fn test_url_construction() {
        assert_eq!(
            backend("https://example.com/data").url_for("kdd.arff"),
            "https://example.com/data/kdd.arff"
        );
        assert_eq!(
            backend("https://example.com/data/").url_for("kdd.arff"),
            "https://example.com/data/kdd.arff"
        );
    }

    #[test]
    fn test_empty_base_uses_key_as_url() {
        assert_eq!(
            backend("").url_for("https://example.com/kdd.arff"),
            "https://example.com/kdd.arff"
        );
    }

    #[test]
    fn test_with_timeout() {
        assert!(HttpBackend::with_timeout("https://example.com", 30).is_ok());
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("arffsplit/"));
    }

    #[test]
    fn test_http_backend_debug() {
        let debug_str = format!("{:?}", backend("https://example.com"));
        assert!(debug_str.contains("HttpBackend"));
        assert!(debug_str.contains("example.com"));
    }
}
