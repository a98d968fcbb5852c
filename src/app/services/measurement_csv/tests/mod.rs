//! Test utilities for measurement file parsing
//!
//! This module provides common fixtures and helper functions used across
//! the parser test modules.

use chrono::{DateTime, TimeZone, Utc};

use super::parser::MeasurementCsvParser;
use super::stats::ParseResult;

mod header_tests;

/// Fixed "current time" so date range checks are deterministic
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Helper to create a well-formed file with the given data rows
pub fn create_test_csv(rows: &[&str]) -> String {
    let mut content = String::from("Date;ExecutionTime;Value\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Helper to parse content with the fixed clock and default row cap
pub fn parse_content(content: &str) -> ParseResult {
    MeasurementCsvParser::new(fixed_now(), 10_000)
        .parse_reader(content.as_bytes())
        .unwrap()
}
