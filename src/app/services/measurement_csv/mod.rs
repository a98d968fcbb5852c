//! Parser and validator for `Date;ExecutionTime;Value` measurement files
//!
//! This module turns a line stream into validated measurement rows plus a
//! complete, ordered list of row errors. Validation is exhaustive: a bad row is
//! recorded and skipped, and the remaining lines are still checked.
//!
//! ## Architecture
//!
//! - [`row_parser`] - Line splitting and field-count checks
//! - [`header`] - Header row recognition
//! - [`field_parsers`] - Per-field parsing (timestamp, integer, decimal)
//! - [`validator`] - Per-row semantic validation producing [`RowError`]s
//! - [`parser`] - Line-by-line state machine tying the pieces together
//! - [`stats`] - Parsing statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use measurement_summary::app::services::measurement_csv::MeasurementCsvParser;
//!
//! # fn example() -> measurement_summary::Result<()> {
//! let content = "Date;ExecutionTime;Value\n2024-07-16T10-05-00.0000Z;15;120.0000\n";
//! let result = MeasurementCsvParser::new(Utc::now(), 10_000).parse_reader(content.as_bytes())?;
//!
//! assert!(result.header.is_recognized());
//! assert_eq!(result.insertable_rows, 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`RowError`]: crate::app::models::RowError

pub mod field_parsers;
pub mod header;
pub mod parser;
pub mod row_parser;
pub mod stats;
pub mod validator;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use header::HeaderState;
pub use parser::MeasurementCsvParser;
pub use row_parser::SplitLine;
pub use stats::{ParseResult, ParseStats};
pub use validator::RowValidator;
