//! Data models for measurement ingestion
//!
//! This module contains the core data structures: validated measurement rows,
//! persisted measurements, per-dataset summaries and row-level error records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Measurements
// =============================================================================

/// A validated data row ready to be inserted for a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeasurement {
    /// Measurement start time (UTC)
    pub start_timestamp: DateTime<Utc>,

    /// Execution time in whole seconds, never negative
    pub execution_seconds: i32,

    /// Store value normalized to the storage scale, never negative
    pub store_value: Decimal,
}

/// A persisted measurement row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Auto-assigned identifier
    pub id: i64,

    /// Owning dataset
    pub dataset_name: String,

    pub start_timestamp: DateTime<Utc>,

    pub execution_seconds: i32,

    pub store_value: Decimal,
}

// =============================================================================
// Dataset Summary
// =============================================================================

/// Precomputed statistical summary of a dataset's measurements
///
/// One row exists per dataset name. It is rewritten in full on every successful
/// ingestion, in the same transaction that replaces the measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset identifier (the uploaded file name)
    pub dataset_name: String,

    /// Whole seconds between the earliest and latest measurement
    pub time_span_seconds: i64,

    /// Earliest measurement timestamp
    pub minimum_timestamp: DateTime<Utc>,

    /// Mean execution time in seconds
    pub avg_execution_seconds: f64,

    /// Mean store value
    pub avg_store_value: Decimal,

    /// Continuous 0.5 percentile of store values
    pub median_store_value: Decimal,

    pub maximum_store_value: Decimal,

    pub minimum_store_value: Decimal,
}

// =============================================================================
// Row Errors
// =============================================================================

/// Input column a field error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Date,
    ExecutionTime,
    Value,
}

impl Column {
    /// Column name as written in the file header
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::ExecutionTime => "ExecutionTime",
            Column::Value => "Value",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found in one input row
///
/// Structural errors (wrong field count) carry no column and hold the raw line
/// as value; field errors name the column and hold the raw field text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based physical line number
    pub row_number: usize,

    /// Offending column, `None` for structural errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,

    /// Raw text that failed
    pub value: String,

    /// Human-readable description
    pub message: String,
}

impl RowError {
    /// Create a structural (field count) error for a whole line
    pub fn structural(row_number: usize, line: impl Into<String>, found: usize) -> Self {
        Self {
            row_number,
            column: None,
            value: line.into(),
            message: format!(
                "Incorrect number of columns: expected {}, found {}.",
                crate::constants::FIELD_COUNT,
                found
            ),
        }
    }

    /// Create a field validation error
    pub fn field(
        row_number: usize,
        column: Column,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_number,
            column: Some(column),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Whether this error concerns the shape of the line rather than a field
    pub fn is_structural(&self) -> bool {
        self.column.is_none()
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(
                f,
                "row {}, column {}: {} (value: '{}')",
                self.row_number, column, self.message, self.value
            ),
            None => write!(
                f,
                "row {}: {} (line: '{}')",
                self.row_number, self.message, self.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_has_no_column() {
        let error = RowError::structural(4, "2024-01-01;5", 2);

        assert!(error.is_structural());
        assert_eq!(error.row_number, 4);
        assert_eq!(error.value, "2024-01-01;5");
        assert!(error.message.contains("expected 3, found 2"));
    }

    #[test]
    fn test_row_error_display() {
        let field = RowError::field(7, Column::ExecutionTime, "-1", "negative");
        assert_eq!(
            field.to_string(),
            "row 7, column ExecutionTime: negative (value: '-1')"
        );

        let structural = RowError::structural(2, "a;b", 2);
        assert!(structural.to_string().starts_with("row 2: Incorrect number"));
    }

    #[test]
    fn test_row_error_serialization_skips_missing_column() {
        let json = serde_json::to_value(RowError::structural(1, "x", 1)).unwrap();
        assert!(json.get("column").is_none());

        let json = serde_json::to_value(RowError::field(1, Column::Value, "x", "bad")).unwrap();
        assert_eq!(json["column"], "Value");
    }
}
