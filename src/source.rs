//! Where ARFF text comes from: local files or HTTP(S) URLs.
//!
//! GitHub `blob` page URLs are rewritten to their raw-content equivalent
//! before fetching. Bytes are decoded as UTF-8, falling back to Latin-1.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tracing::info;

#[cfg(feature = "http")]
use crate::backend::HttpBackend;
#[cfg(feature = "local")]
use crate::backend::LocalBackend;
use crate::{
    arff::ArffDocument,
    backend::StorageBackend,
    config::DEFAULT_HTTP_TIMEOUT_SECS,
    dataset::Dataset,
    error::{Error, Result},
};

/// Required extension for file sources.
pub const ARFF_EXTENSION: &str = "arff";

const GITHUB_PREFIX: &str = "https://github.com/";
const GITHUB_RAW_PREFIX: &str = "https://raw.githubusercontent.com/";

/// A dataset location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Path to a local `.arff` file.
    File(PathBuf),
    /// HTTP(S) URL of an ARFF file.
    Url(String),
}

/// A parsed source together with its display name.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Last path segment of the file or URL.
    pub name: String,
    /// Parsed ARFF content.
    pub document: ArffDocument,
}

impl DataSource {
    /// Classifies a command-line argument: `http://` and `https://` prefixes
    /// make a URL, anything else a file path.
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }

    /// File source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// URL source.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// The URL that is actually fetched, for URL sources.
    pub fn fetch_url(&self) -> Option<String> {
        match self {
            Self::File(_) => None,
            Self::Url(url) => Some(github_raw_url(url)),
        }
    }

    /// Name shown to users: the last segment of the path or fetched URL.
    pub fn display_name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Url(url) => {
                let fetched = github_raw_url(url);
                fetched
                    .rsplit('/')
                    .next()
                    .unwrap_or(fetched.as_str())
                    .to_string()
            }
        }
    }

    /// Loads and parses the source with the default HTTP timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::load_with_timeout`].
    pub fn load(&self) -> Result<LoadedSource> {
        self.load_with_timeout(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Loads and parses the source.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] if a file lacks the `.arff` extension
    /// - [`Error::Io`] if a file cannot be read
    /// - [`Error::Storage`] if a URL cannot be fetched or answers with a
    ///   non-success status
    /// - [`Error::Parse`] or [`Error::EmptyDataset`] for bad content
    pub fn load_with_timeout(&self, timeout_secs: u64) -> Result<LoadedSource> {
        match self {
            #[cfg(feature = "local")]
            Self::File(path) => {
                check_extension(path)?;
                let root = path.parent().unwrap_or_else(|| Path::new(""));
                let backend = LocalBackend::new(root);
                load_from_backend(&backend, &self.display_name())
            }
            #[cfg(not(feature = "local"))]
            Self::File(_) => Err(Error::invalid_config(
                "File sources require the 'local' feature",
            )),
            #[cfg(feature = "http")]
            Self::Url(url) => {
                let fetched = github_raw_url(url);
                let backend = HttpBackend::with_timeout("", timeout_secs)?;
                let loaded = load_from_backend(&backend, &fetched)?;
                Ok(LoadedSource {
                    name: self.display_name(),
                    document: loaded.document,
                })
            }
            #[cfg(not(feature = "http"))]
            Self::Url(_) => {
                let _ = timeout_secs;
                Err(Error::invalid_config("URL sources require the 'http' feature"))
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Reads `key` from a backend and parses it as ARFF.
///
/// # Errors
///
/// Returns the backend's error, or a parse error for bad content.
pub fn load_from_backend(backend: &dyn StorageBackend, key: &str) -> Result<LoadedSource> {
    let bytes = backend.get(key)?;
    let text = decode_text(&bytes);
    let document = ArffDocument::parse(&text)?;

    let name = key.rsplit('/').next().unwrap_or(key).to_string();
    info!(
        source = %name,
        bytes = bytes.len(),
        rows = document.dataset().len(),
        columns = document.dataset().num_columns(),
        "loaded dataset"
    );
    Ok(LoadedSource { name, document })
}

/// Rewrites `https://github.com/<o>/<r>/blob/<ref>/<path>` to
/// `https://raw.githubusercontent.com/<o>/<r>/<ref>/<path>`. Other URLs are
/// returned unchanged.
pub fn github_raw_url(url: &str) -> String {
    match url.strip_prefix(GITHUB_PREFIX) {
        Some(rest) if rest.contains("/blob/") => {
            format!("{}{}", GITHUB_RAW_PREFIX, rest.replacen("/blob/", "/", 1))
        }
        _ => url.to_string(),
    }
}

/// Decodes bytes as UTF-8, or as Latin-1 when they are not valid UTF-8.
/// A leading byte-order mark is dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(ARFF_EXTENSION) => Ok(()),
        Some(ext) => Err(Error::unsupported_format(format!(
            "'.{ext}' (expected a .{ARFF_EXTENSION} file)"
        ))),
        None => Err(Error::unsupported_format(format!(
            "'{}' has no extension (expected a .{ARFF_EXTENSION} file)",
            path.display()
        ))),
    }
}
