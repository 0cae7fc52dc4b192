//! The `split` command: partition a dataset and report label balance.

// Bar lengths are computed from usize counts through f64
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use serde_json::{json, Map, Number, Value};

use super::{basic::load_source, OutputFormat};
use crate::{
    config::SplitConfig,
    distribution::{LabelDistribution, SplitReport},
    split::{DatasetSplit, GroupKey, Partition, SplitRatios, SplitStrategy},
    Dataset,
};

/// Width of the longest bar in a histogram.
const BAR_WIDTH: usize = 40;

/// Command-line overrides for a split run.
pub(crate) struct SplitOptions {
    pub seed: Option<u64>,
    pub ratios: Option<SplitRatios>,
    pub label: Option<String>,
    pub uniform: bool,
    pub format: OutputFormat,
}

/// Split a dataset and print the report.
pub(crate) fn cmd_split(
    source: &str,
    options: &SplitOptions,
    config: &SplitConfig,
) -> crate::Result<()> {
    let seed = options.seed.unwrap_or(config.seed);
    let ratios = options.ratios.unwrap_or(config.ratios);

    let loaded = load_source(source, config)?;
    let name = loaded.name;
    let dataset = loaded.document.into_dataset();

    let strategy = if options.uniform {
        SplitStrategy::Uniform
    } else if let Some(label) = &options.label {
        SplitStrategy::Stratified {
            label_column: label.clone(),
        }
    } else {
        SplitStrategy::detect(&dataset.schema(), &config.label_candidates)
    };

    let split = DatasetSplit::with_strategy(&dataset, &strategy, ratios, seed)?;
    let report = SplitReport::new(&dataset, &split, strategy.label_column())?;

    match options.format {
        OutputFormat::Text => print!("{}", format_text(&name, &strategy, ratios, seed, &report)),
        OutputFormat::Json => {
            let value = report_json(&name, &strategy, ratios, seed, &report);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn format_text(
    name: &str,
    strategy: &SplitStrategy,
    ratios: SplitRatios,
    seed: u64,
    report: &SplitReport,
) -> String {
    let [train, validation, test] = report.partition_rows;

    let mut out = String::new();
    out.push_str(&format!("File: {}\n", name));
    out.push_str(&format!("Strategy: {}\n", strategy));
    out.push_str(&format!("Seed: {}\n", seed));
    out.push_str(&format!("Ratios: {}\n", ratios));
    out.push_str(&format!(
        "Rows: {} (train {}, validation {}, test {})\n",
        report.original_rows, train, validation, test
    ));

    if let (Some(label), Some(original)) = (&report.label_column, &report.original) {
        out.push('\n');
        out.push_str(&histogram(&format!("{} - Dataset", label), original));
        for partition in Partition::ALL {
            if let Some(dist) = report.partition(partition) {
                out.push('\n');
                out.push_str(&histogram(
                    &format!("{} - {}", label, title_case(partition.name())),
                    dist,
                ));
            }
        }
        out.push_str(&format!(
            "\nMax label proportion deviation: {:.4}\n",
            report.max_proportion_deviation()
        ));
    }
    out
}

/// Renders one bar per label, scaled to the most frequent label.
fn histogram(title: &str, dist: &LabelDistribution) -> String {
    let mut out = format!("{} ({} rows)\n", title, dist.total());

    let max = dist.iter().map(|(_, c)| c).max().unwrap_or(0);
    let labels: Vec<(String, usize)> = dist.iter().map(|(k, c)| (k.to_string(), c)).collect();
    let label_width = labels.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    for (label, count) in labels {
        let bar_len = if max == 0 {
            0
        } else {
            ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
        };
        let pct = if dist.total() == 0 {
            0.0
        } else {
            100.0 * count as f64 / dist.total() as f64
        };
        out.push_str(&format!(
            "  {:<width$}  {:<bar$}  {} ({:.1}%)\n",
            label,
            "#".repeat(bar_len),
            count,
            pct,
            width = label_width,
            bar = BAR_WIDTH,
        ));
    }
    out
}

fn report_json(
    name: &str,
    strategy: &SplitStrategy,
    ratios: SplitRatios,
    seed: u64,
    report: &SplitReport,
) -> Value {
    let [train, validation, test] = report.partition_rows;

    let mut distributions = Map::new();
    if let Some(original) = &report.original {
        distributions.insert("dataset".to_string(), counts_json(original));
        for partition in Partition::ALL {
            if let Some(dist) = report.partition(partition) {
                distributions.insert(partition.name().to_string(), counts_json(dist));
            }
        }
    }

    json!({
        "source": name,
        "strategy": strategy,
        "seed": seed,
        "ratios": ratios,
        "rows": {
            "total": report.original_rows,
            "train": train,
            "validation": validation,
            "test": test,
        },
        "label_column": report.label_column,
        "distributions": distributions,
        "max_proportion_deviation": report.max_proportion_deviation(),
    })
}

/// One `{"label", "count"}` entry per group, in group order.
fn counts_json(dist: &LabelDistribution) -> Value {
    dist.iter()
        .map(|(key, count)| json!({ "label": label_json(key), "count": count }))
        .collect()
}

/// Labels keep their JSON type so that `1`, `"1"` and the missing group
/// (`null`) stay distinct.
fn label_json(key: &GroupKey) -> Value {
    match key {
        GroupKey::Boolean(b) => Value::Bool(*b),
        GroupKey::Integer(i) => i64::try_from(*i)
            .map(Value::from)
            .or_else(|_| u64::try_from(*i).map(Value::from))
            .unwrap_or_else(|_| Value::String(i.to_string())),
        GroupKey::Float(x) => Number::from_f64(x.value())
            .map_or_else(|| Value::String(x.value().to_string()), Value::Number),
        GroupKey::Text(s) => Value::String(s.clone()),
        GroupKey::Missing => Value::Null,
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
