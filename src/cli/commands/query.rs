//! Query command

use crate::app::models::Dataset;
use crate::cli::args::{Args, OutputFormat, QueryArgs};
use crate::cli::commands::shared::{CommandReport, print_json};
use crate::cli::input::FilterRequest;
use crate::{DatasetService, Error, Result};
use colored::Colorize;
use std::io::Read;
use std::time::Instant;

pub async fn run_query(
    service: &DatasetService,
    args: &Args,
    query_args: QueryArgs,
) -> Result<CommandReport> {
    let start_time = Instant::now();

    let request = match &query_args.filter_json {
        Some(payload) if payload == "-" => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| Error::io("Failed to read filter from stdin", e))?;
            FilterRequest::from_json(&buffer)?
        }
        Some(payload) => FilterRequest::from_json(payload)?,
        None => query_args.to_filter_request(),
    };
    let filter = request.into_filter()?;

    let datasets = service.query(filter).await?;

    match args.output_format {
        OutputFormat::Json => print_json(&datasets)?,
        OutputFormat::Human => print_datasets(&datasets),
    }

    Ok(CommandReport {
        datasets: datasets.len(),
        measurements: 0,
        elapsed: start_time.elapsed(),
    })
}

fn print_datasets(datasets: &[Dataset]) {
    if datasets.is_empty() {
        println!("No datasets match the filter.");
        return;
    }

    println!(
        "{}",
        format!(
            "{:<32} {:<27} {:>10} {:>12} {:>14} {:>14}",
            "Dataset", "Earliest start", "Span (s)", "Avg exec", "Avg value", "Median"
        )
        .bold()
    );
    for dataset in datasets {
        println!(
            "{:<32} {:<27} {:>10} {:>12.4} {:>14} {:>14}",
            dataset.dataset_name,
            dataset.minimum_timestamp.format("%Y-%m-%dT%H:%M:%S%.4fZ"),
            dataset.time_span_seconds,
            dataset.avg_execution_seconds,
            dataset.avg_store_value,
            dataset.median_store_value
        );
    }
    println!("{} dataset(s)", datasets.len());
}
