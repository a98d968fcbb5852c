//! Latest command

use crate::app::models::Measurement;
use crate::app::services::measurement_csv::field_parsers::format_timestamp;
use crate::cli::args::{Args, LatestArgs, OutputFormat};
use crate::cli::commands::shared::{CommandReport, print_json};
use crate::constants::HEADER_DISPLAY;
use crate::{DatasetService, Result};
use std::time::Instant;

pub async fn run_latest(
    service: &DatasetService,
    args: &Args,
    latest_args: LatestArgs,
) -> Result<CommandReport> {
    let start_time = Instant::now();
    let measurements = service
        .latest(latest_args.dataset_name.as_str(), latest_args.limit)
        .await?;

    match args.output_format {
        OutputFormat::Json => print_json(&measurements)?,
        OutputFormat::Human => print_measurements(&latest_args.dataset_name, &measurements),
    }

    Ok(CommandReport {
        datasets: usize::from(!measurements.is_empty()),
        measurements: measurements.len(),
        elapsed: start_time.elapsed(),
    })
}

/// Print rows in the upload layout so they can be fed back to `ingest`
fn print_measurements(dataset_name: &str, measurements: &[Measurement]) {
    if measurements.is_empty() {
        eprintln!("No measurements found for '{}'.", dataset_name);
        return;
    }

    println!("{}", HEADER_DISPLAY);
    for measurement in measurements {
        println!(
            "{};{};{}",
            format_timestamp(&measurement.start_timestamp),
            measurement.execution_seconds,
            measurement.store_value
        );
    }
}
