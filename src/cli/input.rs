//! Boundary checks for uploads and filter payloads
//!
//! Uploads are rejected before ingestion when they are missing, empty or not
//! `.csv` files. Filter payloads carry dates as strings in the upload format;
//! they are parsed here and rejected with a field-scoped error.

use crate::app::services::dataset_query::DatasetFilter;
use crate::app::services::measurement_csv::field_parsers::parse_timestamp;
use crate::constants::{TIMESTAMP_EXAMPLES, UPLOAD_EXTENSION};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Check an upload and return the dataset name (the file name)
pub fn check_upload(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| Error::invalid_upload(format!("File not found: {}", path.display())))?;
    if !metadata.is_file() {
        return Err(Error::invalid_upload(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(UPLOAD_EXTENSION));
    if !is_csv {
        return Err(Error::invalid_upload("Only files with a .csv extension are accepted"));
    }

    if metadata.len() == 0 {
        return Err(Error::invalid_upload("Upload a non-empty file"));
    }

    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_upload("File name must be valid UTF-8"))
}

/// Filter payload as supplied by callers
///
/// Empty strings mean "no constraint", like absent fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterRequest {
    pub file_name: Option<String>,
    pub min_minimum_timestamp: Option<String>,
    pub max_minimum_timestamp: Option<String>,
    pub min_avg_execution_seconds: Option<f64>,
    pub max_avg_execution_seconds: Option<f64>,
    pub min_avg_store_value: Option<Decimal>,
    pub max_avg_store_value: Option<Decimal>,
    pub min_time_span_seconds: Option<i64>,
    pub max_time_span_seconds: Option<i64>,
}

impl FilterRequest {
    /// Parse a JSON payload
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| {
            Error::invalid_filter("payload", payload.trim(), e.to_string())
        })
    }

    /// Convert into a typed filter, parsing date strings
    pub fn into_filter(self) -> Result<DatasetFilter> {
        let min_timestamp = parse_date_bound("min_minimum_timestamp", self.min_minimum_timestamp)?;
        let max_timestamp = parse_date_bound("max_minimum_timestamp", self.max_minimum_timestamp)?;
        check_finite("min_avg_execution_seconds", self.min_avg_execution_seconds)?;
        check_finite("max_avg_execution_seconds", self.max_avg_execution_seconds)?;

        let mut filter = DatasetFilter::new()
            .with_minimum_timestamp(min_timestamp, max_timestamp)
            .with_avg_execution_seconds(
                self.min_avg_execution_seconds,
                self.max_avg_execution_seconds,
            )
            .with_avg_store_value(self.min_avg_store_value, self.max_avg_store_value)
            .with_time_span_seconds(self.min_time_span_seconds, self.max_time_span_seconds);

        if let Some(name) = self.file_name.filter(|name| !name.is_empty()) {
            filter = filter.with_dataset_name(name);
        }

        Ok(filter)
    }
}

fn parse_date_bound(field: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(value).map(Some).ok_or_else(|| {
            Error::invalid_filter(
                field,
                value,
                format!("Invalid date format. Expected for example {TIMESTAMP_EXAMPLES}."),
            )
        }),
    }
}

fn check_finite(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(Error::invalid_filter(
            field,
            v.to_string(),
            "Value must be a finite number.",
        )),
        _ => Ok(()),
    }
}
