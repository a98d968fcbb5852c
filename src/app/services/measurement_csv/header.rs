//! Header row recognition for measurement files
//!
//! The first line whose first field trims to `date` (case-insensitively) is the
//! header candidate. It is accepted only when its trimmed, lower-cased fields
//! concatenate to `dateexecutiontimevalue`.

use crate::constants::{EXPECTED_HEADER, HEADER_FIRST_FIELD};

/// Header detection state while scanning a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderState {
    /// No header candidate seen yet; lines are preamble
    Missing,

    /// A correct header was found on this row
    Recognized { row_number: usize },

    /// The header candidate on this row had the wrong field names
    Malformed { row_number: usize, line: String },
}

impl HeaderState {
    /// Whether a correct header was found
    pub fn is_recognized(&self) -> bool {
        matches!(self, HeaderState::Recognized { .. })
    }

    /// Whether a header candidate has been seen (correct or not)
    pub fn is_decided(&self) -> bool {
        !matches!(self, HeaderState::Missing)
    }
}

/// Check whether a split line is a header candidate
pub fn is_header_candidate(fields: &[&str]) -> bool {
    fields
        .first()
        .is_some_and(|first| first.trim().eq_ignore_ascii_case(HEADER_FIRST_FIELD))
}

/// Check whether a header candidate carries the expected field names
pub fn is_expected_header(fields: &[&str]) -> bool {
    let joined: String = fields.iter().map(|field| field.trim()).collect();
    joined.to_lowercase() == EXPECTED_HEADER
}

/// Resolve the header state for a candidate line
pub fn classify_candidate(row_number: usize, line: &str, fields: &[&str]) -> HeaderState {
    if is_expected_header(fields) {
        HeaderState::Recognized { row_number }
    } else {
        HeaderState::Malformed {
            row_number,
            line: line.to_string(),
        }
    }
}
