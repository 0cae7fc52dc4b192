// Allow casts for size calculations - these are intentional and safe for
// dataset sizes
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

//! Train/validation/test splitting.
//!
//! Two strategies partition a table into three disjoint subsets that
//! together contain every input row exactly once:
//!
//! - [`DatasetSplit::uniform`] shuffles all rows once and cuts the
//!   permutation at `floor(r_train * n)` and `floor((r_train + r_val) * n)`.
//! - [`DatasetSplit::stratified`] shuffles each label group on its own, cuts
//!   every group proportionally, then reshuffles the pooled partitions so
//!   rows are not clustered by label.
//!
//! Rounding leftovers always go to the test partition (per group, when
//! stratified). Results are identical for identical seeds.
//!
//! # Example
//!
//! ```
//! use arffsplit::{split::{DatasetSplit, SplitRatios}, ArrowDataset, Dataset};
//!
//! let text = "@attribute x numeric\n@attribute protocol_type {tcp,udp}\n@data\n\
//!             1,tcp\n2,tcp\n3,udp\n4,udp\n5,tcp\n";
//! let dataset = ArrowDataset::from_arff_str(text).unwrap();
//!
//! let split = DatasetSplit::uniform(&dataset, SplitRatios::default(), 42).unwrap();
//! assert_eq!(split.train().len() + split.validation().len() + split.test().len(), 5);
//!
//! let split =
//!     DatasetSplit::stratified(&dataset, "protocol_type", SplitRatios::default(), 42).unwrap();
//! assert_eq!(split.sizes().iter().sum::<usize>(), 5);
//! ```

pub mod group;
pub mod shuffle;
pub mod strategy;

use std::{fmt, sync::Arc};

use arrow::{
    array::{Array, RecordBatch, RecordBatchOptions, UInt64Array},
    compute::take,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use self::{
    group::{GroupKey, FloatKey},
    strategy::{SplitStrategy, DEFAULT_LABEL_CANDIDATES},
};
use crate::{
    error::{Error, Result},
    ArrowDataset, Dataset,
};

/// Allowed distance between the ratio sum and 1.0.
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// Proportions for the train, validation and test partitions.
///
/// Always finite, non-negative and summing to 1.0 within
/// [`RATIO_TOLERANCE`]; the only way to build one is through a validating
/// constructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct SplitRatios {
    train: f64,
    validation: f64,
    test: f64,
}

impl SplitRatios {
    /// Creates validated split ratios.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a ratio is negative or not finite,
    /// or if the ratios do not sum to 1.0.
    pub fn new(train: f64, validation: f64, test: f64) -> Result<Self> {
        for (name, value) in [("train", train), ("validation", validation), ("test", test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_config(format!(
                    "Split ratio for {name} must be a non-negative number, got {value}"
                )));
            }
        }

        let total = train + validation + test;
        if (total - 1.0).abs() > RATIO_TOLERANCE {
            return Err(Error::invalid_config(format!(
                "Split ratios must sum to 1.0, got {total}"
            )));
        }

        Ok(Self {
            train,
            validation,
            test,
        })
    }

    /// Parses `"train,validation,test"`, e.g. `"0.6,0.2,0.2"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the string does not hold three
    /// numbers or the numbers are not valid ratios.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [train, validation, test] = parts.as_slice() else {
            return Err(Error::invalid_config(format!(
                "Expected three comma-separated ratios, got '{s}'"
            )));
        };

        let number = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| Error::invalid_config(format!("Invalid split ratio '{v}'")))
        };

        Self::new(number(train)?, number(validation)?, number(test)?)
    }

    /// Training fraction.
    pub fn train(&self) -> f64 {
        self.train
    }

    /// Validation fraction.
    pub fn validation(&self) -> f64 {
        self.validation
    }

    /// Test fraction.
    pub fn test(&self) -> f64 {
        self.test
    }

    /// Fraction for one partition.
    pub fn get(&self, partition: Partition) -> f64 {
        match partition {
            Partition::Train => self.train,
            Partition::Validation => self.validation,
            Partition::Test => self.test,
        }
    }
}

impl Default for SplitRatios {
    /// 60% train, 20% validation, 20% test.
    fn default() -> Self {
        Self {
            train: 0.6,
            validation: 0.2,
            test: 0.2,
        }
    }
}

impl TryFrom<[f64; 3]> for SplitRatios {
    type Error = Error;

    fn try_from(value: [f64; 3]) -> Result<Self> {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<SplitRatios> for [f64; 3] {
    fn from(value: SplitRatios) -> Self {
        [value.train, value.validation, value.test]
    }
}

impl fmt::Display for SplitRatios {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.train, self.validation, self.test)
    }
}

/// One of the three output subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Training rows.
    Train,
    /// Validation rows.
    Validation,
    /// Held-out test rows.
    Test,
}

impl Partition {
    /// All partitions in output order.
    pub const ALL: [Self; 3] = [Self::Train, Self::Validation, Self::Test];

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row indices assigned to each partition, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitIndices {
    /// Rows for training.
    pub train: Vec<usize>,
    /// Rows for validation.
    pub validation: Vec<usize>,
    /// Rows for testing.
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Uniform split of `n` rows.
    pub fn uniform(n: usize, ratios: SplitRatios, seed: u64) -> Self {
        let order = shuffle::permutation(n, seed);

        let t1 = shuffle::floor_count(ratios.train, n);
        let t2 = shuffle::floor_count(ratios.train + ratios.validation, n).max(t1);

        Self {
            train: order[..t1].to_vec(),
            validation: order[t1..t2].to_vec(),
            test: order[t2..].to_vec(),
        }
    }

    /// Stratified split where `keys[i]` is the label of row `i`.
    pub fn stratified(keys: &[GroupKey], ratios: SplitRatios, seed: u64) -> Self {
        let mut out = Self::default();

        for (key, mut rows) in group::group_rows(keys) {
            let group_seed = shuffle::derive_seed(seed, shuffle::GROUP_SCOPE, &key.seed_bytes());
            shuffle::shuffle_in_place(&mut rows, group_seed);

            let size = rows.len();
            let n_train = shuffle::floor_count(ratios.train, size);
            let n_val = shuffle::floor_count(ratios.validation, size).min(size - n_train);
            debug!(
                group = %key,
                size,
                train = n_train,
                validation = n_val,
                test = size - n_train - n_val,
                "split stratum"
            );

            out.train.extend_from_slice(&rows[..n_train]);
            out.validation
                .extend_from_slice(&rows[n_train..n_train + n_val]);
            out.test.extend_from_slice(&rows[n_train + n_val..]);
        }

        for partition in Partition::ALL {
            let pooled_seed =
                shuffle::derive_seed(seed, shuffle::PARTITION_SCOPE, partition.name().as_bytes());
            shuffle::shuffle_in_place(out.get_mut(partition), pooled_seed);
        }

        out
    }

    /// Indices for one partition.
    pub fn get(&self, partition: Partition) -> &[usize] {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
            Partition::Test => &self.test,
        }
    }

    fn get_mut(&mut self, partition: Partition) -> &mut Vec<usize> {
        match partition {
            Partition::Train => &mut self.train,
            Partition::Validation => &mut self.validation,
            Partition::Test => &mut self.test,
        }
    }

    /// Total number of assigned rows.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// True if no rows were assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The three partitions of a dataset.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    /// Training dataset.
    pub train: ArrowDataset,
    /// Validation dataset.
    pub validation: ArrowDataset,
    /// Test/holdout dataset.
    pub test: ArrowDataset,
}

impl DatasetSplit {
    /// Creates a split from already partitioned datasets.
    pub fn new(train: ArrowDataset, validation: ArrowDataset, test: ArrowDataset) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Get training data
    pub fn train(&self) -> &ArrowDataset {
        &self.train
    }

    /// Get validation data
    pub fn validation(&self) -> &ArrowDataset {
        &self.validation
    }

    /// Get test data
    pub fn test(&self) -> &ArrowDataset {
        &self.test
    }

    /// Dataset for one partition.
    pub fn get(&self, partition: Partition) -> &ArrowDataset {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
            Partition::Test => &self.test,
        }
    }

    /// Row counts as `[train, validation, test]`.
    pub fn sizes(&self) -> [usize; 3] {
        Partition::ALL.map(|p| self.get(p).len())
    }

    /// Uniform random split.
    ///
    /// # Arguments
    /// * `dataset` - Source dataset; left untouched
    /// * `ratios` - Partition proportions
    /// * `seed` - Seed for the row permutation
    ///
    /// # Errors
    /// Returns [`Error::EmptyDataset`] if the dataset has no rows.
    pub fn uniform(dataset: &ArrowDataset, ratios: SplitRatios, seed: u64) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let batch = dataset.to_single_batch()?;
        let indices = SplitIndices::uniform(batch.num_rows(), ratios, seed);
        let split = Self::from_indices(&batch, &indices)?;

        info!(
            strategy = "uniform",
            seed,
            rows = batch.num_rows(),
            train = split.train.len(),
            validation = split.validation.len(),
            test = split.test.len(),
            "split dataset"
        );
        Ok(split)
    }

    /// Split dataset by raw ratios.
    ///
    /// # Errors
    /// Returns error if ratios don't form valid [`SplitRatios`] or the
    /// dataset is empty.
    pub fn from_ratios(
        dataset: &ArrowDataset,
        train_ratio: f64,
        validation_ratio: f64,
        test_ratio: f64,
        seed: u64,
    ) -> Result<Self> {
        let ratios = SplitRatios::new(train_ratio, validation_ratio, test_ratio)?;
        Self::uniform(dataset, ratios, seed)
    }

    /// Stratified split preserving the label distribution.
    ///
    /// Rows with a missing label form their own stratum.
    ///
    /// # Arguments
    /// * `dataset` - Source dataset; left untouched
    /// * `label_column` - Name of the categorical label column
    /// * `ratios` - Partition proportions
    /// * `seed` - Master seed for all group and partition shuffles
    ///
    /// # Errors
    /// - [`Error::InvalidConfig`] if the label column does not exist or has
    ///   an unsupported type
    /// - [`Error::EmptyDataset`] if the dataset has no rows
    pub fn stratified(
        dataset: &ArrowDataset,
        label_column: &str,
        ratios: SplitRatios,
        seed: u64,
    ) -> Result<Self> {
        let label_idx = dataset.schema().index_of(label_column).map_err(|_| {
            Error::invalid_config(format!("Label column '{label_column}' not found"))
        })?;

        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let batch = dataset.to_single_batch()?;
        let keys = group::label_keys(batch.column(label_idx).as_ref())?;
        let indices = SplitIndices::stratified(&keys, ratios, seed);
        let split = Self::from_indices(&batch, &indices)?;

        info!(
            strategy = "stratified",
            label = label_column,
            seed,
            rows = batch.num_rows(),
            train = split.train.len(),
            validation = split.validation.len(),
            test = split.test.len(),
            "split dataset"
        );
        Ok(split)
    }

    /// Runs the split described by `strategy`.
    ///
    /// # Errors
    /// Same as [`Self::uniform`] and [`Self::stratified`].
    pub fn with_strategy(
        dataset: &ArrowDataset,
        strategy: &SplitStrategy,
        ratios: SplitRatios,
        seed: u64,
    ) -> Result<Self> {
        match strategy {
            SplitStrategy::Uniform => Self::uniform(dataset, ratios, seed),
            SplitStrategy::Stratified { label_column } => {
                Self::stratified(dataset, label_column, ratios, seed)
            }
        }
    }

    fn from_indices(batch: &RecordBatch, indices: &SplitIndices) -> Result<Self> {
        let [train, validation, test] =
            Partition::ALL.map(|p| take_indices(batch, indices.get(p)));
        Ok(Self {
            train: ArrowDataset::from_batch(train?)?,
            validation: ArrowDataset::from_batch(validation?)?,
            test: ArrowDataset::from_batch(test?)?,
        })
    }
}

/// Take rows at given indices from a batch
fn take_indices(batch: &RecordBatch, indices: &[usize]) -> Result<RecordBatch> {
    let indices_array = UInt64Array::from_iter_values(indices.iter().map(|&i| i as u64));

    let columns: Vec<Arc<dyn Array>> = batch
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), &indices_array, None).map_err(Error::Arrow))
        .collect::<Result<Vec<_>>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(indices.len()));
    RecordBatch::try_new_with_options(batch.schema(), columns, &options).map_err(Error::Arrow)
}
