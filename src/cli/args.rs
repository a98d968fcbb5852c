//! Command-line argument definitions
//!
//! This module defines the CLI interface using the clap derive API. Global
//! options (database, config file, verbosity, output format) apply to every
//! subcommand.

use crate::cli::input::FilterRequest;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// CLI arguments for the measurement summary tool
#[derive(Debug, Clone, Parser)]
#[command(
    name = "measurement-summary",
    version,
    about = "Ingest measurement CSV files and query per-dataset statistical summaries",
    long_about = "Ingests `Date;ExecutionTime;Value` measurement files into a SQLite database. \
                  Each file replaces any earlier upload with the same name, atomically, and \
                  refreshes the dataset summary (time span, averages, median, extrema). \
                  Summaries can be filtered by range and raw measurements listed per dataset."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the SQLite database
    ///
    /// Overrides the config file and the MEASUREMENT_SUMMARY_DATABASE variable.
    #[arg(long = "database", value_name = "FILE", global = true)]
    pub database: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        global = true
    )]
    pub output_format: OutputFormat,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest a CSV file, replacing the dataset named after the file
    Ingest(IngestArgs),
    /// List dataset summaries matching range filters
    Query(QueryArgs),
    /// List a dataset's measurements in ascending timestamp order
    Latest(LatestArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Measurement file with a `.csv` extension
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Abort and roll back the ingestion after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Range filters for the query command
///
/// Dates use the upload format, e.g. `2024-07-16T16-30-00.1234Z`.
#[derive(Debug, Clone, Default, Parser)]
pub struct QueryArgs {
    /// Exact dataset (file) name
    #[arg(long = "name", value_name = "NAME")]
    pub dataset_name: Option<String>,

    #[arg(long = "min-timestamp", value_name = "DATE")]
    pub min_minimum_timestamp: Option<String>,

    #[arg(long = "max-timestamp", value_name = "DATE")]
    pub max_minimum_timestamp: Option<String>,

    #[arg(long = "min-avg-execution", value_name = "SECONDS")]
    pub min_avg_execution_seconds: Option<f64>,

    #[arg(long = "max-avg-execution", value_name = "SECONDS")]
    pub max_avg_execution_seconds: Option<f64>,

    #[arg(long = "min-avg-value", value_name = "DECIMAL")]
    pub min_avg_store_value: Option<Decimal>,

    #[arg(long = "max-avg-value", value_name = "DECIMAL")]
    pub max_avg_store_value: Option<Decimal>,

    #[arg(long = "min-time-span", value_name = "SECONDS")]
    pub min_time_span_seconds: Option<i64>,

    #[arg(long = "max-time-span", value_name = "SECONDS")]
    pub max_time_span_seconds: Option<i64>,

    /// Filter as a JSON object, `-` reads it from stdin
    ///
    /// Uses the same field names as the flags in snake_case, e.g.
    /// `{"min_avg_execution_seconds": 16, "min_minimum_timestamp": "2024-01-01T00-00-00.0000Z"}`.
    #[arg(
        long = "filter-json",
        value_name = "JSON",
        conflicts_with_all = [
            "dataset_name", "min_minimum_timestamp", "max_minimum_timestamp",
            "min_avg_execution_seconds", "max_avg_execution_seconds",
            "min_avg_store_value", "max_avg_store_value",
            "min_time_span_seconds", "max_time_span_seconds",
        ]
    )]
    pub filter_json: Option<String>,
}

impl QueryArgs {
    /// Collect the flag values into a filter request
    pub fn to_filter_request(&self) -> FilterRequest {
        FilterRequest {
            file_name: self.dataset_name.clone(),
            min_minimum_timestamp: self.min_minimum_timestamp.clone(),
            max_minimum_timestamp: self.max_minimum_timestamp.clone(),
            min_avg_execution_seconds: self.min_avg_execution_seconds,
            max_avg_execution_seconds: self.max_avg_execution_seconds,
            min_avg_store_value: self.min_avg_store_value,
            max_avg_store_value: self.max_avg_store_value,
            min_time_span_seconds: self.min_time_span_seconds,
            max_time_span_seconds: self.max_time_span_seconds,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct LatestArgs {
    /// Dataset (file) name
    #[arg(value_name = "NAME")]
    pub dataset_name: String,

    /// Return at most this many measurements
    #[arg(short = 'n', long = "limit", value_name = "COUNT")]
    pub limit: Option<usize>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Validate arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(Commands::Ingest(ingest)) = &self.command {
            if ingest.timeout_secs == Some(0) {
                return Err(Error::configuration("Timeout must be greater than 0 seconds"));
            }
        }

        if let Some(Commands::Latest(latest)) = &self.command {
            if latest.limit == Some(0) {
                return Err(Error::configuration("Limit must be greater than 0"));
            }
        }

        Ok(())
    }

    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress spinners only make sense for interactive human output
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}
