//! Line-by-line parser for measurement files
//!
//! The parser is a small state machine: lines before the header candidate are
//! preamble, the candidate decides the header state, and every later line is a
//! data row. It never stops early; the ingestion pipeline applies file-level
//! policy once the whole stream has been seen.

use std::io::BufRead;
use tracing::{debug, trace};

use super::header::{HeaderState, classify_candidate, is_header_candidate};
use super::row_parser::{SplitLine, split_line};
use super::stats::{ParseResult, ParseStats};
use super::validator::RowValidator;
use crate::app::models::{NewMeasurement, RowError};
use crate::constants::{FIELD_COUNT, UTF8_BOM};
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Streaming parser for `Date;ExecutionTime;Value` files
#[derive(Debug)]
pub struct MeasurementCsvParser {
    validator: RowValidator,
    row_cap: usize,
    header: HeaderState,
    measurements: Vec<NewMeasurement>,
    insertable_rows: usize,
    errors: Vec<RowError>,
    stats: ParseStats,
}

impl MeasurementCsvParser {
    /// Create a parser validating dates up to `now`, retaining at most `row_cap` rows
    pub fn new(now: DateTime<Utc>, row_cap: usize) -> Self {
        Self::with_validator(RowValidator::new(now), row_cap)
    }

    /// Create a parser with an explicit validator
    pub fn with_validator(validator: RowValidator, row_cap: usize) -> Self {
        Self {
            validator,
            row_cap,
            header: HeaderState::Missing,
            measurements: Vec::new(),
            insertable_rows: 0,
            errors: Vec::new(),
            stats: ParseStats::new(),
        }
    }

    /// Feed one physical line; `row_number` is its 1-based position in the file
    pub fn push_line(&mut self, row_number: usize, line: &str) {
        self.stats.total_lines += 1;
        let line = if self.stats.total_lines == 1 {
            line.strip_prefix(UTF8_BOM).unwrap_or(line)
        } else {
            line
        };

        match split_line(line) {
            SplitLine::Blank => {
                self.stats.blank_lines += 1;
            }
            SplitLine::WrongArity { found } => {
                trace!("Row {} has {} fields", row_number, found);
                self.stats.invalid_rows += 1;
                self.errors
                    .push(RowError::structural(row_number, line, found));
            }
            SplitLine::Fields(fields) => {
                if self.header.is_decided() {
                    self.push_data_row(row_number, &fields);
                } else if is_header_candidate(&fields) {
                    self.header = classify_candidate(row_number, line, &fields);
                    debug!("Header candidate on row {}: {:?}", row_number, self.header);
                } else {
                    self.stats.preamble_lines += 1;
                }
            }
        }
    }

    fn push_data_row(&mut self, row_number: usize, fields: &[&str; FIELD_COUNT]) {
        self.stats.data_rows += 1;

        match self.validator.validate(row_number, fields) {
            Ok(measurement) => {
                self.stats.valid_rows += 1;
                self.insertable_rows += 1;
                if self.measurements.len() < self.row_cap {
                    self.measurements.push(measurement);
                }
            }
            Err(row_errors) => {
                self.stats.invalid_rows += 1;
                debug!("Row {} rejected with {} error(s)", row_number, row_errors.len());
                self.errors.extend(row_errors);
            }
        }
    }

    /// Consume the parser and return the accumulated result
    pub fn finish(self) -> ParseResult {
        ParseResult {
            header: self.header,
            measurements: self.measurements,
            insertable_rows: self.insertable_rows,
            errors: self.errors,
            stats: self.stats,
        }
    }

    /// Parse a whole reader in one go
    pub fn parse_reader<R: BufRead>(mut self, reader: R) -> Result<ParseResult> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io(format!("Failed to read line {}", index + 1), e))?;
            self.push_line(index + 1, &line);
        }
        Ok(self.finish())
    }
}
