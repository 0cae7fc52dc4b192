//! Dataset types for arffsplit.
//!
//! Provides the [`Dataset`] trait and [`ArrowDataset`], the in-memory table
//! that the split engine consumes and produces.

use std::{path::Path, sync::Arc};

use arrow::{
    array::{Array, RecordBatch},
    compute::concat_batches,
    datatypes::{Schema, SchemaRef},
};

use crate::error::{Error, Result};

/// A dataset that can be iterated over.
///
/// Datasets provide access to tabular data stored as Arrow RecordBatches.
/// All implementations must be thread-safe (Send + Sync).
pub trait Dataset: Send + Sync {
    /// Returns the total number of rows in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset contains no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the schema of the dataset.
    fn schema(&self) -> SchemaRef;

    /// Returns an iterator over all RecordBatches in the dataset.
    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_>;
}

/// An in-memory table backed by Arrow RecordBatches.
///
/// Numeric ARFF attributes are stored as `Float64`, everything else as
/// `Utf8`; missing values are Arrow nulls.
///
/// # Example
///
/// ```
/// use arffsplit::{ArrowDataset, Dataset};
///
/// let text = "@relation demo\n@attribute x numeric\n@attribute y {a,b}\n@data\n1,a\n2,b\n";
/// let dataset = ArrowDataset::from_arff_str(text).unwrap();
/// assert_eq!(dataset.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ArrowDataset {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

impl ArrowDataset {
    /// Creates a new ArrowDataset from a vector of RecordBatches.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batches vector is empty
    /// - The batches have inconsistent schemas
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::EmptyDataset);
        };
        let schema = first.schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::invalid_config(format!(
                    "Batch {} has different schema than batch 0",
                    i
                )));
            }
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates an ArrowDataset from a single RecordBatch.
    ///
    /// A batch with zero rows is accepted; splitting such a dataset is what
    /// gets rejected.
    ///
    /// # Errors
    ///
    /// Never fails for a single batch; the signature matches [`Self::new`].
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Creates a dataset with the given schema and no rows.
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            batches: vec![RecordBatch::new_empty(Arc::clone(&schema))],
            schema,
            row_count: 0,
        }
    }

    /// Parses ARFF text into a dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid ARFF or has no data rows.
    pub fn from_arff_str(text: &str) -> Result<Self> {
        crate::arff::ArffDocument::parse(text).map(|doc| doc.into_dataset())
    }

    /// Loads a dataset from a local `.arff` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_arff(path: impl AsRef<Path>) -> Result<Self> {
        let loaded = crate::source::DataSource::file(path.as_ref()).load()?;
        Ok(loaded.document.into_dataset())
    }

    /// Returns the underlying batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Consumes the dataset and returns the underlying batches.
    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name().as_str()).collect()
    }

    /// Returns the index of the named column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .map_err(|_| Error::column_not_found(name))
    }

    /// Returns the number of missing values per column, in schema order.
    pub fn null_counts(&self) -> Vec<usize> {
        (0..self.num_columns())
            .map(|col| {
                self.batches
                    .iter()
                    .map(|b| b.column(col).null_count())
                    .sum()
            })
            .collect()
    }

    /// Returns all rows as one RecordBatch.
    ///
    /// # Errors
    ///
    /// Returns an error if Arrow fails to concatenate the batches.
    pub fn to_single_batch(&self) -> Result<RecordBatch> {
        if let [batch] = self.batches.as_slice() {
            return Ok(batch.clone());
        }
        concat_batches(&self.schema, &self.batches).map_err(Error::Arrow)
    }

    /// Returns the first `n` rows as slices of the underlying batches.
    pub fn head(&self, n: usize) -> Vec<RecordBatch> {
        let mut collected = Vec::new();
        let mut count = 0;

        for batch in &self.batches {
            if count >= n {
                break;
            }
            let take = (n - count).min(batch.num_rows());
            if take > 0 {
                collected.push(batch.slice(0, take));
                count += take;
            }
        }

        collected
    }

    /// Returns true if `other` has exactly this dataset's schema.
    pub fn same_schema(&self, other: &Schema) -> bool {
        self.schema.as_ref() == other
    }
}

impl Dataset for ArrowDataset {
    fn len(&self) -> usize {
        self.row_count
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_> {
        Box::new(self.batches.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use arrow::{
        array::{Float64Array, StringArray},
        datatypes::{DataType, Field},
    };

    use super::*;

    fn create_test_batch(start: usize, count: usize) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("duration", DataType::Float64, true),
            Field::new("protocol_type", DataType::Utf8, true),
        ]));

        let values: Vec<f64> = (start..start + count).map(|i| i as f64).collect();
        let labels: Vec<Option<&str>> = (start..start + count)
            .map(|i| if i % 4 == 3 { None } else { Some("tcp") })
            .collect();

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(values)),
                Arc::new(StringArray::from(labels)),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Failed to create test batch"))
    }

    #[test]
    fn test_new_dataset() {
        let dataset = ArrowDataset::new(vec![create_test_batch(0, 10)])
            .unwrap_or_else(|e| panic!("Should create dataset: {e}"));
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.num_columns(), 2);
    }

    #[test]
    fn test_empty_batches_error() {
        let result = ArrowDataset::new(vec![]);
        assert!(matches!(result, Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_empty_constructor_keeps_schema() {
        let schema = create_test_batch(0, 1).schema();
        let dataset = ArrowDataset::empty(Arc::clone(&schema));
        assert!(dataset.is_empty());
        assert_eq!(dataset.schema(), schema);
        assert_eq!(dataset.batches().len(), 1);
    }

    #[test]
    fn test_schema_mismatch_error() {
        let other_schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Float64, false)]));
        let other = RecordBatch::try_new(
            other_schema,
            vec![Arc::new(Float64Array::from(vec![1.0]))],
        )
        .unwrap_or_else(|e| panic!("batch: {e}"));

        let result = ArrowDataset::new(vec![create_test_batch(0, 2), other]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rows_counted_across_batches() {
        let dataset = ArrowDataset::new(vec![create_test_batch(0, 5), create_test_batch(5, 5)])
            .unwrap_or_else(|e| panic!("Should create dataset: {e}"));

        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.iter().count(), 2);

        let batch = dataset
            .to_single_batch()
            .unwrap_or_else(|e| panic!("concat: {e}"));
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap_or_else(|| panic!("downcast"));
        assert_eq!(col.value(7), 7.0);
    }

    #[test]
    fn test_column_index() {
        let dataset = ArrowDataset::from_batch(create_test_batch(0, 3))
            .unwrap_or_else(|e| panic!("dataset: {e}"));
        assert_eq!(dataset.column_index("protocol_type").ok(), Some(1));
        assert!(matches!(
            dataset.column_index("service"),
            Err(Error::ColumnNotFound { .. })
        ));
        assert_eq!(dataset.column_names(), vec!["duration", "protocol_type"]);
    }

    #[test]
    fn test_null_counts() {
        let dataset = ArrowDataset::new(vec![create_test_batch(0, 4), create_test_batch(4, 4)])
            .unwrap_or_else(|e| panic!("dataset: {e}"));
        assert_eq!(dataset.null_counts(), vec![0, 2]);
    }

    #[test]
    fn test_to_single_batch_concatenates() {
        let dataset = ArrowDataset::new(vec![create_test_batch(0, 3), create_test_batch(3, 4)])
            .unwrap_or_else(|e| panic!("dataset: {e}"));
        let batch = dataset
            .to_single_batch()
            .unwrap_or_else(|e| panic!("concat: {e}"));
        assert_eq!(batch.num_rows(), 7);
    }

    #[test]
    fn test_head_spans_batches() {
        let dataset = ArrowDataset::new(vec![create_test_batch(0, 3), create_test_batch(3, 4)])
            .unwrap_or_else(|e| panic!("dataset: {e}"));

        let head = dataset.head(5);
        assert_eq!(head.len(), 2);
        assert_eq!(head.iter().map(|b| b.num_rows()).sum::<usize>(), 5);

        let all = dataset.head(200);
        assert_eq!(all.iter().map(|b| b.num_rows()).sum::<usize>(), 7);

        assert!(dataset.head(0).is_empty());
    }

    #[test]
    fn test_from_arff_str() {
        let text = "@relation t\n@attribute a numeric\n@attribute b string\n@data\n1,x\n?,y\n";
        let dataset = ArrowDataset::from_arff_str(text).unwrap_or_else(|e| panic!("parse: {e}"));
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.null_counts(), vec![1, 0]);
    }

    #[test]
    fn test_clone_and_debug() {
        let dataset = ArrowDataset::from_batch(create_test_batch(0, 3))
            .unwrap_or_else(|e| panic!("dataset: {e}"));
        let cloned = dataset.clone();
        assert_eq!(cloned.len(), dataset.len());
        assert!(format!("{:?}", dataset).contains("ArrowDataset"));
        assert!(dataset.same_schema(cloned.schema().as_ref()));
    }

    #[test]
    fn test_missing_labels_are_nulls() {
        let batch = create_test_batch(0, 4);
        let labels = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap_or_else(|| panic!("downcast"));
        assert!(labels.is_null(3));
    }
}
