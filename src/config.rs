//! Run configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "seed": 7, "ratios": [0.7, 0.15, 0.15] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    split::{SplitRatios, DEFAULT_LABEL_CANDIDATES},
};

/// Default master seed.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of rows shown by previews.
pub const DEFAULT_PREVIEW_ROWS: usize = 200;

/// Default timeout for remote fetches, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Settings for loading and splitting a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Master seed for all shuffles.
    pub seed: u64,
    /// Train/validation/test proportions.
    pub ratios: SplitRatios,
    /// Column names that select stratified splitting, matched ignoring case.
    pub label_candidates: Vec<String>,
    /// Rows shown by the `head` preview.
    pub preview_rows: usize,
    /// Timeout for URL sources, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            ratios: SplitRatios::default(),
            label_candidates: DEFAULT_LABEL_CANDIDATES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl SplitConfig {
    /// Parses a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed JSON, unknown keys or
    /// invalid ratios.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::invalid_config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or the errors of
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_json_str(&json)
    }

    /// Checks the values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(Error::invalid_config("http_timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Returns the config with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the config with different ratios.
    #[must_use]
    pub fn with_ratios(mut self, ratios: SplitRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Returns the config with a different candidate list.
    #[must_use]
    pub fn with_label_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }
}
