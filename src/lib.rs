//! arffsplit - Reproducible dataset splitting for ARFF files
//!
//! Loads an ARFF dataset (local file or HTTP(S)/GitHub URL) into Arrow
//! `RecordBatch`es and partitions its rows into train, validation and test
//! subsets.
//!
//! # Design Principles
//!
//! 1. **No lost rows** - every input row lands in exactly one partition
//! 2. **Reproducible** - a seed fully determines membership and order
//! 3. **Label-aware** - stratified splits keep per-label proportions
//! 4. **Arrow throughout** - inputs and outputs are `RecordBatch`es
//!
//! # Quick Start
//!
//! ```no_run
//! use arffsplit::{split::SplitStrategy, ArrowDataset, Dataset, DatasetSplit, SplitRatios};
//!
//! let dataset = ArrowDataset::from_arff("data/KDDTrain+.arff").unwrap();
//!
//! // Stratify on protocol_type when the column exists
//! let strategy = SplitStrategy::detect(&dataset.schema(), &["protocol_type"]);
//! let split =
//!     DatasetSplit::with_strategy(&dataset, &strategy, SplitRatios::default(), 42).unwrap();
//!
//! println!(
//!     "train {} / validation {} / test {}",
//!     split.train().len(),
//!     split.validation().len(),
//!     split.test().len()
//! );
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_lossless,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::similar_names
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod arff;
pub mod backend;
/// CLI module for command-line interface
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod source;
pub mod split;

// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use arff::ArffDocument;
pub use config::SplitConfig;
pub use dataset::{ArrowDataset, Dataset};
pub use distribution::{LabelDistribution, SplitReport};
pub use error::{Error, Result};
pub use source::{DataSource, LoadedSource};
pub use split::{DatasetSplit, Partition, SplitRatios, SplitStrategy};
