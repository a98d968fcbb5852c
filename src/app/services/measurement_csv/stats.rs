//! Parsing statistics and result structures for measurement files
//!
//! This module provides types for tracking how each physical line was handled
//! and for handing the validated rows and errors to the ingestion pipeline.

use super::header::HeaderState;
use crate::app::models::{NewMeasurement, RowError};

/// Parsing result with validated rows, row errors and statistics
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Header detection outcome
    pub header: HeaderState,

    /// Validated rows in file order (at most the configured row cap)
    pub measurements: Vec<NewMeasurement>,

    /// Number of rows that passed validation, including any beyond the cap
    pub insertable_rows: usize,

    /// Every row error in file order
    pub errors: Vec<RowError>,

    /// Per-line statistics
    pub stats: ParseStats,
}

impl ParseResult {
    /// Whether any row failed validation
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Simple parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Physical lines read, including blank ones
    pub total_lines: usize,

    /// Empty or whitespace-only lines
    pub blank_lines: usize,

    /// Lines skipped before the header candidate
    pub preamble_lines: usize,

    /// Data rows examined after the header candidate
    pub data_rows: usize,

    /// Data rows that passed validation
    pub valid_rows: usize,

    /// Rows rejected (structural or field errors)
    pub invalid_rows: usize,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }
}
