//! Synchronous ingestion pipeline

use chrono::{DateTime, Utc};
use std::io::BufRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::models::{Dataset, NewMeasurement};
use crate::app::services::aggregation;
use crate::app::services::measurement_csv::{MeasurementCsvParser, ParseResult};
use crate::app::storage::{SqliteStore, StoreTransaction};
use crate::config::IngestionConfig;
use crate::constants::MAX_DATASET_NAME_LEN;
use crate::{Error, Result};

/// Check that a dataset name is non-empty and at most 255 characters
pub fn validate_dataset_name(dataset_name: &str) -> Result<()> {
    if dataset_name.trim().is_empty() {
        return Err(Error::invalid_dataset_name(
            dataset_name,
            "name cannot be empty",
        ));
    }

    let length = dataset_name.chars().count();
    if length > MAX_DATASET_NAME_LEN {
        return Err(Error::invalid_dataset_name(
            dataset_name,
            format!("name has {length} characters, at most {MAX_DATASET_NAME_LEN} are allowed"),
        ));
    }

    Ok(())
}

/// Runs one ingestion inside a single store transaction
#[derive(Debug, Clone)]
pub struct Ingestor {
    policy: IngestionConfig,
    now: Option<DateTime<Utc>>,
}

impl Ingestor {
    pub fn new(policy: IngestionConfig) -> Self {
        Self { policy, now: None }
    }

    /// Validate dates against a fixed "current time" instead of the wall clock
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Replace a dataset's measurements and summary with the content of `reader`
    ///
    /// Either every change is committed or none is. User-correctable problems
    /// and aggregation failures are returned as they are; any other failure is
    /// wrapped in [`Error::Operational`].
    pub fn ingest<R: BufRead>(
        &self,
        store: &mut SqliteStore,
        dataset_name: &str,
        reader: R,
        cancel: &CancellationToken,
    ) -> Result<Dataset> {
        validate_dataset_name(dataset_name)?;
        info!("Ingesting dataset '{}'", dataset_name);

        let tx = store
            .begin()
            .map_err(|e| into_ingestion_error(dataset_name, e))?;

        match self.replace_and_recompute(&tx, dataset_name, reader, cancel) {
            Ok(dataset) => {
                tx.commit()
                    .map_err(|e| into_ingestion_error(dataset_name, e))?;
                info!(
                    "Committed dataset '{}' (median {}, span {}s)",
                    dataset_name, dataset.median_store_value, dataset.time_span_seconds
                );
                Ok(dataset)
            }
            Err(e) => {
                warn!("Rolling back ingestion of '{}': {}", dataset_name, e);
                if let Err(rollback_error) = tx.rollback() {
                    error!(
                        "Rollback of '{}' failed: {:?}",
                        dataset_name, rollback_error
                    );
                }
                Err(into_ingestion_error(dataset_name, e))
            }
        }
    }

    fn replace_and_recompute<R: BufRead>(
        &self,
        tx: &StoreTransaction<'_>,
        dataset_name: &str,
        mut reader: R,
        cancel: &CancellationToken,
    ) -> Result<Dataset> {
        tx.delete_dataset(dataset_name)?;

        let now = self.now.unwrap_or_else(Utc::now);
        let mut parser = MeasurementCsvParser::new(now, self.policy.max_rows);
        let mut buffer = Vec::new();
        let mut row_number = 0;

        loop {
            check_cancelled(dataset_name, cancel)?;

            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer).map_err(|e| {
                Error::io(format!("Failed to read line {}", row_number + 1), e)
            })?;
            if read == 0 {
                break;
            }

            row_number += 1;
            let line = String::from_utf8_lossy(strip_line_ending(&buffer));
            parser.push_line(row_number, &line);
        }

        let parsed = parser.finish();
        debug!(
            "Parsed '{}': {} line(s), {} valid row(s), {} error(s)",
            dataset_name,
            parsed.stats.total_lines,
            parsed.insertable_rows,
            parsed.errors.len()
        );

        let measurements = self.check_file_policy(dataset_name, parsed)?;
        tx.insert_measurements(dataset_name, &measurements)?;
        let dataset = aggregation::recompute(tx, dataset_name)?;

        check_cancelled(dataset_name, cancel)?;
        Ok(dataset)
    }

    /// File-level checks, in order: header, row errors, row count
    fn check_file_policy(
        &self,
        dataset_name: &str,
        parsed: ParseResult,
    ) -> Result<Vec<NewMeasurement>> {
        if !parsed.header.is_recognized() {
            return Err(Error::header_format(dataset_name));
        }

        if parsed.has_errors() {
            for row_error in &parsed.errors {
                debug!("{}: {}", dataset_name, row_error);
            }
            return Err(Error::validation(dataset_name, parsed.errors));
        }

        let found = parsed.insertable_rows;
        let (min, max) = (self.policy.min_rows, self.policy.max_rows);
        if found < min || found > max {
            return Err(Error::row_count(dataset_name, found, min, max));
        }

        Ok(parsed.measurements)
    }
}

fn check_cancelled(dataset_name: &str, cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::processing_interrupted(format!(
            "ingestion of '{dataset_name}' was cancelled"
        )));
    }
    Ok(())
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn into_ingestion_error(dataset_name: &str, error: Error) -> Error {
    match error {
        e if e.is_user_correctable() => e,
        e @ (Error::Aggregation { .. }
        | Error::ProcessingInterrupted { .. }
        | Error::Operational { .. }) => e,
        e => {
            error!("Ingestion of '{}' failed: {:?}", dataset_name, e);
            Error::operational(dataset_name, e)
        }
    }
}
