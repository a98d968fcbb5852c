//! Line splitting for measurement files
//!
//! Lines are split on `;` and must yield exactly three fields. Blank lines are
//! reported separately so the caller can skip them without raising an error.

use crate::constants::{FIELD_COUNT, FIELD_DELIMITER};

/// Outcome of splitting one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitLine<'a> {
    /// Empty or whitespace-only line
    Blank,

    /// Exactly three raw (untrimmed) fields: date, execution time, value
    Fields([&'a str; FIELD_COUNT]),

    /// Any other field count
    WrongArity { found: usize },
}

/// Split a line into its raw fields
pub fn split_line(line: &str) -> SplitLine<'_> {
    if line.trim().is_empty() {
        return SplitLine::Blank;
    }

    let mut parts = line.split(FIELD_DELIMITER);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(execution_time), Some(value), None) => {
            SplitLine::Fields([date, execution_time, value])
        }
        _ => SplitLine::WrongArity {
            found: line.split(FIELD_DELIMITER).count(),
        },
    }
}
