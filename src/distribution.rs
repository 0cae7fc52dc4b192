//! Label distributions of a dataset and its partitions.
//!
//! Used to report how well a split preserved the class balance of the
//! source table.
//!
//! # Example
//!
//! ```
//! use arffsplit::{
//!     distribution::SplitReport,
//!     split::{DatasetSplit, SplitRatios},
//!     ArrowDataset,
//! };
//!
//! let text = "@attribute proto {tcp,udp}\n@data\ntcp\ntcp\ntcp\nudp\nudp\n";
//! let dataset = ArrowDataset::from_arff_str(text).unwrap();
//! let split = DatasetSplit::stratified(&dataset, "proto", SplitRatios::default(), 42).unwrap();
//!
//! let report = SplitReport::new(&dataset, &split, Some("proto")).unwrap();
//! assert_eq!(report.total_rows(), 5);
//! ```

// Proportions require usize->f64 casts
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use crate::{
    dataset::{ArrowDataset, Dataset},
    error::{Error, Result},
    split::{group, DatasetSplit, GroupKey, Partition},
};

/// Count of rows per label value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDistribution {
    counts: BTreeMap<GroupKey, usize>,
    total: usize,
}

impl LabelDistribution {
    /// Builds a distribution from pre-computed keys.
    pub fn from_keys(keys: &[GroupKey]) -> Self {
        let mut counts = BTreeMap::new();
        for key in keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }
        Self {
            counts,
            total: keys.len(),
        }
    }

    /// Counts the values of `column` across all batches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the column is absent or cannot be
    /// used as a label.
    pub fn from_dataset(dataset: &ArrowDataset, column: &str) -> Result<Self> {
        let col_idx = dataset
            .schema()
            .index_of(column)
            .map_err(|_| Error::invalid_config(format!("Label column '{column}' not found")))?;

        let mut keys = Vec::with_capacity(dataset.len());
        for batch in dataset.iter() {
            keys.extend(group::label_keys(batch.column(col_idx).as_ref())?);
        }
        Ok(Self::from_keys(&keys))
    }

    /// Number of rows counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct labels, the missing group included.
    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    /// Rows with the given label.
    pub fn count(&self, key: &GroupKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Fraction of rows with the given label; 0.0 for an empty
    /// distribution.
    pub fn proportion(&self, key: &GroupKey) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(key) as f64 / self.total as f64
        }
    }

    /// Labels and counts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, usize)> + '_ {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    /// Most frequent label. Ties go to the smallest key.
    pub fn majority(&self) -> Option<&GroupKey> {
        self.counts
            .iter()
            .rev()
            .max_by_key(|(_, &v)| v)
            .map(|(k, _)| k)
    }

    /// Least frequent label. Ties go to the smallest key.
    pub fn minority(&self) -> Option<&GroupKey> {
        self.counts
            .iter()
            .min_by_key(|(_, &v)| v)
            .map(|(k, _)| k)
    }
}

/// Row counts and label distributions for a split.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Label column the distributions were computed on.
    pub label_column: Option<String>,
    /// Rows in the source dataset.
    pub original_rows: usize,
    /// Rows per partition as `[train, validation, test]`.
    pub partition_rows: [usize; 3],
    /// Distribution of the source dataset, when a label column is set.
    pub original: Option<LabelDistribution>,
    /// Distributions per partition, when a label column is set.
    pub partitions: Option<[LabelDistribution; 3]>,
}

impl SplitReport {
    /// Summarizes `split`, computing label distributions when `label` is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the label column cannot be
    /// counted.
    pub fn new(original: &ArrowDataset, split: &DatasetSplit, label: Option<&str>) -> Result<Self> {
        let (original_dist, partitions) = match label {
            Some(column) => {
                let [train, validation, test] = Partition::ALL
                    .map(|p| LabelDistribution::from_dataset(split.get(p), column));
                (
                    Some(LabelDistribution::from_dataset(original, column)?),
                    Some([train?, validation?, test?]),
                )
            }
            None => (None, None),
        };

        Ok(Self {
            label_column: label.map(str::to_string),
            original_rows: original.len(),
            partition_rows: split.sizes(),
            original: original_dist,
            partitions,
        })
    }

    /// Rows across all partitions.
    pub fn total_rows(&self) -> usize {
        self.partition_rows.iter().sum()
    }

    /// Distribution for one partition.
    pub fn partition(&self, partition: Partition) -> Option<&LabelDistribution> {
        self.partitions
            .as_ref()
            .map(|dists| &dists[partition as usize])
    }

    /// Largest absolute gap between a label's proportion in a non-empty
    /// partition and in the source dataset. 0.0 without a label column.
    pub fn max_proportion_deviation(&self) -> f64 {
        let (Some(original), Some(partitions)) = (&self.original, &self.partitions) else {
            return 0.0;
        };

        partitions
            .iter()
            .filter(|dist| dist.total() > 0)
            .flat_map(|dist| {
                original
                    .iter()
                    .map(move |(key, _)| (dist.proportion(key) - original.proportion(key)).abs())
            })
            .fold(0.0, f64::max)
    }
}
