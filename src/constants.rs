//! Application constants for the measurement summary service
//!
//! This module contains the input format definition, validation bounds,
//! storage scale and default configuration values used throughout the crate.

// =============================================================================
// Input File Format
// =============================================================================

/// Field delimiter for measurement files
pub const FIELD_DELIMITER: char = ';';

/// Number of fields every data row must have
pub const FIELD_COUNT: usize = 3;

/// First header field, matched case-insensitively after trimming
pub const HEADER_FIRST_FIELD: &str = "date";

/// Concatenated, trimmed, lower-cased header the file must carry
pub const EXPECTED_HEADER: &str = "dateexecutiontimevalue";

/// Header line as shown to users
pub const HEADER_DISPLAY: &str = "Date;ExecutionTime;Value";

/// Timestamp layout: `yyyy-MM-ddTHH-mm-ss.ffffZ`
///
/// `d` marks a required ASCII digit, every other character must match literally.
pub const TIMESTAMP_TEMPLATE: &str = "dddd-dd-ddTdd-dd-dd.ddddZ";

/// chrono layout for the date/time part of [`TIMESTAMP_TEMPLATE`] (first 19 characters)
pub const TIMESTAMP_SECONDS_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Example timestamps used in user-facing messages
pub const TIMESTAMP_EXAMPLES: &str = "2023-01-01T00-00-00.0000Z or 2024-07-16T16-30-00.1234Z";

/// Leading byte-order mark some editors write at the start of a file
pub const UTF8_BOM: char = '\u{feff}';

/// Required upload file extension (compared case-insensitively)
pub const UPLOAD_EXTENSION: &str = "csv";

// =============================================================================
// Validation Bounds
// =============================================================================

/// Minimum number of insertable rows per ingestion
pub const MIN_ROWS: usize = 1;

/// Maximum number of insertable rows per ingestion
pub const MAX_ROWS: usize = 10_000;

/// Earliest accepted measurement timestamp, 2000-01-01T00:00:00Z as Unix seconds
pub const EARLIEST_TIMESTAMP_UNIX_SECS: i64 = 946_684_800;

/// Maximum dataset name length in characters
pub const MAX_DATASET_NAME_LEN: usize = 255;

// =============================================================================
// Fixed-Point Storage
// =============================================================================

/// Fractional digits kept for store values and decimal summary fields
pub const STORE_VALUE_SCALE: u32 = 4;

/// Total significant digits of the decimal storage type, `decimal(18,4)`
pub const STORE_VALUE_PRECISION: u32 = 18;

/// Microseconds per fractional-second digit of the timestamp layout (1/10000 s)
pub const MICROS_PER_FRACTION_UNIT: i64 = 100;

/// Continuous percentile used for the median
pub const MEDIAN_PERCENTILE: f64 = 0.5;

// =============================================================================
// Defaults
// =============================================================================

/// Application directory name under the platform data directory
pub const APP_DIR_NAME: &str = "measurement-summary";

/// Default database file name
pub const DEFAULT_DATABASE_FILE: &str = "measurements.db";

/// Default SQLite busy timeout in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Environment variable overriding the database path
pub const ENV_DATABASE_PATH: &str = "MEASUREMENT_SUMMARY_DATABASE";

/// Environment variable setting the ingestion timeout in seconds
pub const ENV_INGEST_TIMEOUT_SECS: &str = "MEASUREMENT_SUMMARY_INGEST_TIMEOUT_SECS";

/// Environment variable overriding the SQLite busy timeout
pub const ENV_BUSY_TIMEOUT_MS: &str = "MEASUREMENT_SUMMARY_BUSY_TIMEOUT_MS";

/// Generic message shown for failures that are not user-correctable
pub const GENERIC_FAILURE_MESSAGE: &str = "An internal error occurred while processing the request.";
