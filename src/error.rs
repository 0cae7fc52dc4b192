//! Error types for arffsplit.

use std::path::PathBuf;

/// Result type alias for arffsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or splitting a dataset.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error during data processing.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error while reading a configuration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Column not found in schema.
    #[error("Column '{name}' not found in schema")]
    ColumnNotFound {
        /// The name of the missing column.
        name: String,
    },

    /// Invalid configuration: bad split ratios, unknown label column, or a
    /// malformed option.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Unsupported file format.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The unsupported format name or extension.
        format: String,
    },

    /// The input table has no rows.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Backend storage error (local or remote fetch).
    #[error("Storage backend error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// Malformed ARFF content.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a column not found error.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Returns true if the caller must fix the call (ratios, column names,
    /// options) before retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::ColumnNotFound { .. })
    }
}
