//! arffsplit CLI - inspect ARFF datasets and split them for training
//!
//! Command-line interface for arffsplit operations.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{config::SplitConfig, split::SplitRatios, Result};

mod basic;
mod split;

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

/// arffsplit - Train/validation/test splitting for ARFF datasets
#[derive(Parser)]
#[command(name = "arffsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for URL sources, in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display dataset information
    Info {
        /// Path to an .arff file or an HTTP(S)/GitHub URL
        source: String,
    },
    /// Display dataset schema
    Schema {
        /// Path to an .arff file or an HTTP(S)/GitHub URL
        source: String,
    },
    /// Display first N rows of a dataset
    Head {
        /// Path to an .arff file or an HTTP(S)/GitHub URL
        source: String,
        /// Number of rows to display
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },
    /// Split a dataset into train/validation/test and report the result
    Split {
        /// Path to an .arff file or an HTTP(S)/GitHub URL
        source: String,
        /// Master seed
        #[arg(long)]
        seed: Option<u64>,
        /// Ratios as train,validation,test (e.g. 0.6,0.2,0.2)
        #[arg(long)]
        ratios: Option<String>,
        /// Stratify on this column instead of auto-detecting one
        #[arg(long, conflicts_with = "uniform")]
        label: Option<String>,
        /// Always use a uniform split
        #[arg(long)]
        uniform: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// How `split` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary with bar charts.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Run the arffsplit CLI.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = load_config(cli.config.as_ref(), cli.timeout).and_then(|config| {
        match cli.command {
            Commands::Info { source } => basic::cmd_info(&source, &config),
            Commands::Schema { source } => basic::cmd_schema(&source, &config),
            Commands::Head { source, rows } => {
                basic::cmd_head(&source, rows.unwrap_or(config.preview_rows), &config)
            }
            Commands::Split {
                source,
                seed,
                ratios,
                label,
                uniform,
                format,
            } => {
                let options = split::SplitOptions {
                    seed,
                    ratios: ratios.as_deref().map(SplitRatios::parse).transpose()?,
                    label,
                    uniform,
                    format,
                };
                split::cmd_split(&source, &options, &config)
            }
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so that reports on stdout stay machine-readable.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>, timeout: Option<u64>) -> Result<SplitConfig> {
    let mut config = match path {
        Some(path) => SplitConfig::from_json_file(path)?,
        None => SplitConfig::default(),
    };
    if let Some(secs) = timeout {
        config.http_timeout_secs = secs;
        config.validate()?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_split_flags() {
        let cli = Cli::try_parse_from([
            "arffsplit",
            "split",
            "data.arff",
            "--seed",
            "7",
            "--ratios",
            "0.7,0.15,0.15",
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap_or_else(|e| panic!("parse: {e}"));

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Split {
                source,
                seed,
                ratios,
                uniform,
                format,
                ..
            } => {
                assert_eq!(source, "data.arff");
                assert_eq!(seed, Some(7));
                assert_eq!(ratios.as_deref(), Some("0.7,0.15,0.15"));
                assert!(!uniform);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected split command"),
        }
    }

    #[test]
    fn test_label_conflicts_with_uniform() {
        let result = Cli::try_parse_from([
            "arffsplit",
            "split",
            "data.arff",
            "--label",
            "class",
            "--uniform",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_head_rows_flag() {
        let cli = Cli::try_parse_from(["arffsplit", "head", "data.arff", "-n", "5"])
            .unwrap_or_else(|e| panic!("parse: {e}"));
        assert!(matches!(cli.command, Commands::Head { rows: Some(5), .. }));
    }

    #[test]
    fn test_load_config_defaults_and_timeout_override() {
        let config = load_config(None, Some(3)).unwrap_or_else(|e| panic!("config: {e}"));
        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.seed, 42);
        assert!(load_config(None, Some(0)).is_err());
    }
}
