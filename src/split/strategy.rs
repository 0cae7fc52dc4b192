//! Choosing between uniform and stratified splitting.

use std::fmt;

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

/// Column names that trigger stratification when present.
pub const DEFAULT_LABEL_CANDIDATES: &[&str] = &["protocol_type"];

/// How rows are assigned to partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitStrategy {
    /// One global shuffle cut at fixed proportions.
    Uniform,
    /// Per-label shuffles that keep each label's proportion in every
    /// partition.
    Stratified {
        /// Column whose values define the strata.
        label_column: String,
    },
}

impl SplitStrategy {
    /// Stratifies on the first schema column that matches a candidate name,
    /// ignoring ASCII case; falls back to [`SplitStrategy::Uniform`].
    ///
    /// The returned label uses the schema's spelling of the column name.
    pub fn detect<S: AsRef<str>>(schema: &Schema, candidates: &[S]) -> Self {
        candidates
            .iter()
            .find_map(|candidate| {
                schema
                    .fields()
                    .iter()
                    .find(|f| f.name().eq_ignore_ascii_case(candidate.as_ref()))
            })
            .map_or(Self::Uniform, |field| Self::Stratified {
                label_column: field.name().clone(),
            })
    }

    /// Label column, for stratified splits.
    pub fn label_column(&self) -> Option<&str> {
        match self {
            Self::Uniform => None,
            Self::Stratified { label_column } => Some(label_column),
        }
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Stratified { label_column } => write!(f, "stratified by '{}'", label_column),
        }
    }
}
