//! Integration tests for arffsplit.

#![allow(clippy::cast_possible_truncation, clippy::uninlined_format_args)]

use std::{collections::HashMap, path::PathBuf};

use arffsplit::{
    arff::AttributeKind,
    backend::MemoryBackend,
    source::{self, DataSource},
    split::{GroupKey, SplitIndices},
    ArrowDataset, Dataset, DatasetSplit, Error, LabelDistribution, Partition, SplitConfig,
    SplitRatios, SplitReport, SplitStrategy,
};
use arrow::{
    array::{Array, Float64Array, StringArray},
    datatypes::DataType,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/protocols.arff")
}

fn load_fixture() -> ArrowDataset {
    ArrowDataset::from_arff(fixture_path())
        .ok()
        .unwrap_or_else(|| panic!("Should load fixture"))
}

/// Collects every row of a partition as a printable string.
fn row_strings(dataset: &ArrowDataset) -> Vec<String> {
    let mut rows = Vec::new();
    for batch in dataset.iter() {
        for row in 0..batch.num_rows() {
            let cells: Vec<String> = batch
                .columns()
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        return "?".to_string();
                    }
                    if let Some(a) = col.as_any().downcast_ref::<Float64Array>() {
                        a.value(row).to_string()
                    } else if let Some(a) = col.as_any().downcast_ref::<StringArray>() {
                        a.value(row).to_string()
                    } else {
                        panic!("unexpected column type {}", col.data_type())
                    }
                })
                .collect();
            rows.push(cells.join(","));
        }
    }
    rows
}

fn multiset(rows: Vec<String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for r in rows {
        *counts.entry(r).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_fixture_schema() {
    let loaded = DataSource::file(fixture_path())
        .load()
        .ok()
        .unwrap_or_else(|| panic!("Should load"));
    let document = &loaded.document;

    assert_eq!(loaded.name, "protocols.arff");
    assert_eq!(document.relation(), Some("nsl-kdd-sample"));
    assert!(document.names_from_header());
    assert_eq!(
        document.declared_kind("protocol_type"),
        Some(&AttributeKind::Nominal(vec![
            "tcp".to_string(),
            "udp".to_string(),
            "icmp".to_string()
        ]))
    );

    let dataset = document.dataset();
    assert_eq!(dataset.len(), 20);
    assert_eq!(
        dataset.column_names(),
        vec!["duration", "protocol_type", "service", "src_bytes", "class"]
    );

    let schema = dataset.schema();
    assert_eq!(schema.field(0).data_type(), &DataType::Float64);
    assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(3).data_type(), &DataType::Float64);
    assert_eq!(dataset.null_counts(), vec![0, 0, 0, 1, 0]);
}

#[test]
fn test_auto_detected_stratified_split() {
    let dataset = load_fixture();
    let config = SplitConfig::default();

    let strategy = SplitStrategy::detect(&dataset.schema(), &config.label_candidates);
    assert_eq!(strategy.label_column(), Some("protocol_type"));

    let split = DatasetSplit::with_strategy(&dataset, &strategy, config.ratios, config.seed)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));

    // tcp 12 -> 7/2/3, udp 5 -> 3/1/1, icmp 3 -> 1/0/2
    assert_eq!(split.sizes(), [11, 3, 6]);

    let report = SplitReport::new(&dataset, &split, strategy.label_column())
        .ok()
        .unwrap_or_else(|| panic!("Should report"));
    let train = report
        .partition(Partition::Train)
        .unwrap_or_else(|| panic!("train distribution"));
    assert_eq!(train.count(&GroupKey::from("tcp")), 7);
    assert_eq!(train.count(&GroupKey::from("udp")), 3);
    assert_eq!(train.count(&GroupKey::from("icmp")), 1);

    let test = report
        .partition(Partition::Test)
        .unwrap_or_else(|| panic!("test distribution"));
    assert_eq!(test.count(&GroupKey::from("icmp")), 2);
}

#[test]
fn test_split_preserves_every_row() {
    let dataset = load_fixture();
    let original = multiset(row_strings(&dataset));

    for strategy in [
        SplitStrategy::Uniform,
        SplitStrategy::Stratified {
            label_column: "class".to_string(),
        },
    ] {
        let split = DatasetSplit::with_strategy(&dataset, &strategy, SplitRatios::default(), 9)
            .ok()
            .unwrap_or_else(|| panic!("Should split"));

        let mut rows = Vec::new();
        for partition in Partition::ALL {
            assert!(split.get(partition).same_schema(&dataset.schema()));
            rows.extend(row_strings(split.get(partition)));
        }
        assert_eq!(multiset(rows), original, "strategy {strategy}");
    }
}

#[test]
fn test_uniform_split_sizes() {
    let dataset = load_fixture();
    let split = DatasetSplit::uniform(&dataset, SplitRatios::default(), 42)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));
    assert_eq!(split.sizes(), [12, 4, 4]);
}

#[test]
fn test_same_seed_same_partitions() {
    let dataset = load_fixture();
    let a = DatasetSplit::stratified(&dataset, "protocol_type", SplitRatios::default(), 42)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));
    let b = DatasetSplit::stratified(&dataset, "protocol_type", SplitRatios::default(), 42)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));

    for partition in Partition::ALL {
        assert_eq!(row_strings(a.get(partition)), row_strings(b.get(partition)));
    }
}

#[test]
fn test_index_level_split_matches_dataset_split() {
    let dataset = load_fixture();
    let split = DatasetSplit::uniform(&dataset, SplitRatios::default(), 5)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));
    let indices = SplitIndices::uniform(dataset.len(), SplitRatios::default(), 5);

    let all_rows = row_strings(&dataset);
    let expected: Vec<String> = indices.train.iter().map(|&i| all_rows[i].clone()).collect();
    assert_eq!(row_strings(split.train()), expected);
}

#[test]
fn test_unknown_label_is_configuration_error() {
    let dataset = load_fixture();
    let err = DatasetSplit::stratified(&dataset, "service_type", SplitRatios::default(), 42)
        .err()
        .unwrap_or_else(|| panic!("Should fail"));
    assert!(err.is_configuration());
}

#[test]
fn test_invalid_ratios_rejected_before_split() {
    let dataset = load_fixture();
    assert!(matches!(
        DatasetSplit::from_ratios(&dataset, 0.5, 0.3, 0.3, 42),
        Err(Error::InvalidConfig { .. })
    ));
}

#[test]
fn test_header_only_file_is_empty_input() {
    let dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let path = dir.path().join("empty.arff");
    std::fs::write(&path, "@relation e\n@attribute a numeric\n@data\n")
        .ok()
        .unwrap_or_else(|| panic!("Should write"));

    assert!(matches!(
        ArrowDataset::from_arff(&path),
        Err(Error::EmptyDataset)
    ));
}

#[test]
fn test_latin1_file_loads() {
    let dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let path = dir.path().join("latin1.arff");
    let mut bytes = b"@attribute city string\n@attribute n numeric\n@data\n".to_vec();
    bytes.extend_from_slice(b"Espa\xF1a,1\nM\xE9xico,2\n");
    std::fs::write(&path, bytes)
        .ok()
        .unwrap_or_else(|| panic!("Should write"));

    let dataset = ArrowDataset::from_arff(&path)
        .ok()
        .unwrap_or_else(|| panic!("Should load"));
    let rows = row_strings(&dataset);
    assert_eq!(rows, vec!["España,1", "México,2"]);
}

#[test]
fn test_memory_backend_source() {
    let backend = MemoryBackend::new();
    let text = std::fs::read(fixture_path())
        .ok()
        .unwrap_or_else(|| panic!("Should read fixture"));
    backend
        .insert("nsl/protocols.arff", text)
        .ok()
        .unwrap_or_else(|| panic!("Should insert"));

    let loaded = source::load_from_backend(&backend, "nsl/protocols.arff")
        .ok()
        .unwrap_or_else(|| panic!("Should load"));
    let dataset = loaded.document.into_dataset();

    let dist = LabelDistribution::from_dataset(&dataset, "class")
        .ok()
        .unwrap_or_else(|| panic!("Should count"));
    assert_eq!(dist.count(&GroupKey::from("normal")), 12);
    assert_eq!(dist.count(&GroupKey::from("anomaly")), 8);
    assert_eq!(dist.majority(), Some(&GroupKey::from("normal")));
}

#[test]
fn test_config_file_drives_split() {
    let dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let path = dir.path().join("arffsplit.json");
    std::fs::write(
        &path,
        r#"{"seed": 3, "ratios": [0.5, 0.25, 0.25], "label_candidates": ["CLASS"]}"#,
    )
    .ok()
    .unwrap_or_else(|| panic!("Should write"));

    let config = SplitConfig::from_json_file(&path)
        .ok()
        .unwrap_or_else(|| panic!("Should load config"));
    let dataset = load_fixture();
    let strategy = SplitStrategy::detect(&dataset.schema(), &config.label_candidates);
    assert_eq!(strategy.label_column(), Some("class"));

    let split = DatasetSplit::with_strategy(&dataset, &strategy, config.ratios, config.seed)
        .ok()
        .unwrap_or_else(|| panic!("Should split"));
    // normal 12 -> 6/3/3, anomaly 8 -> 4/2/2
    assert_eq!(split.sizes(), [10, 5, 5]);
}
