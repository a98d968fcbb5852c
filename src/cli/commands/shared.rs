//! Shared components for CLI commands
//!
//! Logging setup, configuration layering, progress spinners and the
//! rendering of results and errors.

use crate::cli::args::{Args, OutputFormat};
use crate::config::Config;
use crate::constants::GENERIC_FAILURE_MESSAGE;
use crate::{Error, Result, RowError};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

/// What a command did, for the final log line
#[derive(Debug, Clone, Default)]
pub struct CommandReport {
    /// Datasets written or returned
    pub datasets: usize,
    /// Measurements written or returned
    pub measurements: usize,
    pub elapsed: Duration,
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("measurement_summary={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration: defaults, config file, environment, then CLI flags
pub fn load_configuration(args: &Args) -> Result<Config> {
    let mut config = Config::load_layered(args.config_file.as_deref())?;

    if let Some(database) = &args.database {
        config = config.with_database_path(database);
    }

    config.validate()?;
    Ok(config)
}

/// Spinner for long-running work, hidden when progress is disabled
pub fn create_spinner(message: impl Into<String>, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| Error::configuration(format!("Failed to serialize output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// JSON shape of a failed command
#[derive(Debug, Serialize)]
struct ErrorOutput {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    row_errors: Vec<RowError>,
}

/// Message shown to users for an error
///
/// User-correctable errors are shown in full; anything else is replaced by a
/// generic message and logged.
pub fn user_message(error: &Error) -> String {
    if error.is_user_correctable() {
        error.to_string()
    } else {
        GENERIC_FAILURE_MESSAGE.to_string()
    }
}

/// Report a failed command on stderr (human) or stdout (JSON)
pub fn report_error(error: &Error, format: OutputFormat) {
    if !error.is_user_correctable() {
        error!("Command failed: {:?}", error);
    }

    let message = user_message(error);
    match format {
        OutputFormat::Json => {
            let output = ErrorOutput {
                error: message,
                row_errors: error.row_errors().to_vec(),
            };
            if let Ok(rendered) = serde_json::to_string_pretty(&output) {
                println!("{}", rendered);
            }
        }
        OutputFormat::Human => {
            eprintln!("{} {}", "Error:".red().bold(), message);
            for row_error in error.row_errors() {
                let location = match row_error.column {
                    Some(column) => format!("row {}, {}", row_error.row_number, column),
                    None => format!("row {}", row_error.row_number),
                };
                eprintln!(
                    "  {} {} ({})",
                    format!("{location}:").yellow(),
                    row_error.message,
                    format!("'{}'", row_error.value).dimmed()
                );
            }
        }
    }
}
