//! Inspection commands: info, schema and head.

use arrow::util::pretty::pretty_format_batches;

use crate::{
    config::SplitConfig,
    source::{DataSource, LoadedSource},
    Dataset,
};

/// Load and parse a file path or URL argument.
pub(crate) fn load_source(source: &str, config: &SplitConfig) -> crate::Result<LoadedSource> {
    DataSource::parse(source).load_with_timeout(config.http_timeout_secs)
}

/// Display dataset information.
pub(crate) fn cmd_info(source: &str, config: &SplitConfig) -> crate::Result<()> {
    let loaded = load_source(source, config)?;
    print!("{}", format_info(&loaded));
    Ok(())
}

fn format_info(loaded: &LoadedSource) -> String {
    let document = &loaded.document;
    let dataset = document.dataset();

    let mut out = String::new();
    out.push_str(&format!("File: {}\n", loaded.name));
    out.push_str(&format!(
        "Relation: {}\n",
        document.relation().unwrap_or("-")
    ));
    out.push_str(&format!("Rows: {}\n", dataset.len()));
    out.push_str(&format!("Columns: {}\n", dataset.num_columns()));

    let missing: Vec<(&str, usize)> = dataset
        .column_names()
        .into_iter()
        .zip(dataset.null_counts())
        .filter(|(_, n)| *n > 0)
        .collect();

    if missing.is_empty() {
        out.push_str("Missing values: none\n");
    } else {
        out.push_str("Missing values:\n");
        for (name, count) in missing {
            out.push_str(&format!("  {}: {}\n", name, count));
        }
    }
    out
}

/// Display dataset schema.
pub(crate) fn cmd_schema(source: &str, config: &SplitConfig) -> crate::Result<()> {
    let loaded = load_source(source, config)?;
    print!("{}", format_schema(&loaded));
    Ok(())
}

fn format_schema(loaded: &LoadedSource) -> String {
    let document = &loaded.document;
    let schema = document.dataset().schema();

    let mut out = format!("Schema for {}:\n\n", loaded.name);
    for (i, field) in schema.fields().iter().enumerate() {
        let declared = document
            .declared_kind(field.name())
            .map_or_else(|| "-".to_string(), ToString::to_string);
        out.push_str(&format!(
            "  {}: {} ({}) [{}]\n",
            i,
            field.name(),
            declared,
            field.data_type()
        ));
    }

    if !document.names_from_header() {
        out.push_str(&format!(
            "\nNote: {} declared attributes do not match the data, using generated names\n",
            document.attributes().len()
        ));
    }
    out.push_str(&format!("\nTotal columns: {}\n", schema.fields().len()));
    out
}

/// Display first N rows of a dataset.
pub(crate) fn cmd_head(source: &str, rows: usize, config: &SplitConfig) -> crate::Result<()> {
    let loaded = load_source(source, config)?;
    let dataset = loaded.document.dataset();

    let collected = dataset.head(rows);
    if collected.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    // Nulls render as empty cells
    let table = pretty_format_batches(&collected).map_err(crate::Error::Arrow)?;
    println!("{table}");

    let shown: usize = collected.iter().map(|b| b.num_rows()).sum();
    if shown < dataset.len() {
        println!("... showing {} of {} rows", shown, dataset.len());
    }

    Ok(())
}
