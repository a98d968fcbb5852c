//! Per-row semantic validation
//!
//! Every field of a row is checked independently, so one row can yield up to
//! three errors. A sign or range check only runs when its field parsed.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use super::field_parsers::{
    fits_storage_precision, normalize_store_value, parse_execution_seconds, parse_store_value,
    parse_timestamp,
};
use crate::app::models::{Column, NewMeasurement, RowError};
use crate::constants::{EARLIEST_TIMESTAMP_UNIX_SECS, FIELD_COUNT, TIMESTAMP_EXAMPLES};

/// Validates data rows against the accepted timestamp window
#[derive(Debug, Clone)]
pub struct RowValidator {
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
}

impl RowValidator {
    /// Create a validator accepting timestamps from 2000-01-01T00:00:00Z up to `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            earliest: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(EARLIEST_TIMESTAMP_UNIX_SECS),
            latest: now,
        }
    }

    /// Validate the three raw fields of a data row
    ///
    /// Returns the normalized measurement, or every error found in the row.
    pub fn validate(
        &self,
        row_number: usize,
        fields: &[&str; FIELD_COUNT],
    ) -> std::result::Result<NewMeasurement, Vec<RowError>> {
        let [date_raw, execution_raw, value_raw] = *fields;
        let mut errors = Vec::new();

        let start_timestamp = self.validate_timestamp(row_number, date_raw, &mut errors);
        let execution_seconds = validate_execution_seconds(row_number, execution_raw, &mut errors);
        let store_value = validate_store_value(row_number, value_raw, &mut errors);

        match (start_timestamp, execution_seconds, store_value) {
            (Some(start_timestamp), Some(execution_seconds), Some(store_value))
                if errors.is_empty() =>
            {
                Ok(NewMeasurement {
                    start_timestamp,
                    execution_seconds,
                    store_value,
                })
            }
            _ => Err(errors),
        }
    }

    fn validate_timestamp(
        &self,
        row_number: usize,
        raw: &str,
        errors: &mut Vec<RowError>,
    ) -> Option<DateTime<Utc>> {
        let Some(timestamp) = parse_timestamp(raw) else {
            errors.push(RowError::field(
                row_number,
                Column::Date,
                raw,
                format!("Invalid date format. Expected for example {TIMESTAMP_EXAMPLES}."),
            ));
            return None;
        };

        if timestamp < self.earliest || timestamp > self.latest {
            errors.push(RowError::field(
                row_number,
                Column::Date,
                raw,
                "Date cannot be earlier than 2000-01-01 or later than the current time.",
            ));
            return None;
        }

        Some(timestamp)
    }
}

fn validate_execution_seconds(
    row_number: usize,
    raw: &str,
    errors: &mut Vec<RowError>,
) -> Option<i32> {
    let Some(seconds) = parse_execution_seconds(raw) else {
        errors.push(RowError::field(
            row_number,
            Column::ExecutionTime,
            raw,
            "Invalid execution time format, expected an integer.",
        ));
        return None;
    };

    if seconds < 0 {
        errors.push(RowError::field(
            row_number,
            Column::ExecutionTime,
            raw,
            "Execution time cannot be negative.",
        ));
        return None;
    }

    Some(seconds)
}

fn validate_store_value(
    row_number: usize,
    raw: &str,
    errors: &mut Vec<RowError>,
) -> Option<Decimal> {
    let Some(value) = parse_store_value(raw) else {
        errors.push(RowError::field(
            row_number,
            Column::Value,
            raw,
            "Invalid store value format, expected a decimal number.",
        ));
        return None;
    };

    if value.is_sign_negative() && !value.is_zero() {
        errors.push(RowError::field(
            row_number,
            Column::Value,
            raw,
            "Store value cannot be negative.",
        ));
        return None;
    }

    let normalized = normalize_store_value(value);
    if !fits_storage_precision(normalized) {
        errors.push(RowError::field(
            row_number,
            Column::Value,
            raw,
            "Store value is too large, at most 14 integer digits are supported.",
        ));
        return None;
    }

    Some(normalized.abs())
}
