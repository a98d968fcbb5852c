//! Ingest command
//!
//! Checks the upload, then replaces the dataset named after the file.

use crate::app::models::Dataset;
use crate::cli::args::{Args, IngestArgs, OutputFormat};
use crate::cli::commands::shared::{CommandReport, create_spinner, print_json};
use crate::cli::input::check_upload;
use crate::{DatasetService, Error, Result};
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use tracing::info;

pub async fn run_ingest(
    service: &DatasetService,
    args: &Args,
    ingest_args: IngestArgs,
) -> Result<CommandReport> {
    let start_time = Instant::now();
    let dataset_name = check_upload(&ingest_args.file)?;

    let file = File::open(&ingest_args.file).map_err(|e| {
        Error::io(
            format!("Failed to open {}", ingest_args.file.display()),
            e,
        )
    })?;

    let spinner = create_spinner(format!("Ingesting {}", dataset_name), args.show_progress());
    let result = service
        .ingest(dataset_name.clone(), BufReader::new(file))
        .await;
    spinner.finish_and_clear();

    let dataset = result?;
    let measurements = service.measurement_count(dataset_name.as_str()).await?;
    info!(
        "Ingested {} measurement(s) into '{}' in {:.2?}",
        measurements,
        dataset_name,
        start_time.elapsed()
    );

    match args.output_format {
        OutputFormat::Json => print_json(&dataset)?,
        OutputFormat::Human => print_ingest_summary(&dataset, measurements),
    }

    Ok(CommandReport {
        datasets: 1,
        measurements,
        elapsed: start_time.elapsed(),
    })
}

fn print_ingest_summary(dataset: &Dataset, measurements: usize) {
    println!(
        "{} File '{}' uploaded and processed ({} measurements)",
        "✓".green().bold(),
        dataset.dataset_name,
        measurements
    );
    println!("  Earliest start:   {}", dataset.minimum_timestamp.to_rfc3339());
    println!("  Time span:        {} s", dataset.time_span_seconds);
    println!("  Avg execution:    {:.4} s", dataset.avg_execution_seconds);
    println!("  Avg value:        {}", dataset.avg_store_value);
    println!("  Median value:     {}", dataset.median_store_value);
    println!(
        "  Min / max value:  {} / {}",
        dataset.minimum_store_value, dataset.maximum_store_value
    );
}
