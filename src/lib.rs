//! Measurement Summary Library
//!
//! A Rust library for ingesting delimited measurement files into a SQLite store
//! and maintaining a precomputed statistical summary per dataset.
//!
//! This library provides tools for:
//! - Parsing `Date;ExecutionTime;Value` files with header detection
//! - Exhaustive per-row validation producing a complete error report
//! - Atomic replace-and-recompute ingestion per dataset name
//! - Summary statistics including an exact continuous-percentile median
//! - Range-filtered dataset queries and per-dataset measurement lookups

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod storage;
    pub mod services {
        pub mod aggregation;
        pub mod dataset_query;
        pub mod ingestion;
        pub mod measurement_csv;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
}

// Re-export commonly used types
pub use app::models::{Column, Dataset, Measurement, NewMeasurement, RowError};
pub use app::services::dataset_query::DatasetFilter;
pub use app::services::ingestion::DatasetService;
pub use config::Config;

/// Result type alias for the measurement summary service
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ingestion, aggregation and query operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage engine failure
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Dataset name is empty or too long
    #[error("Invalid dataset name '{dataset}': {message}")]
    InvalidDatasetName { dataset: String, message: String },

    /// Missing or incorrect header row
    #[error("{message}")]
    HeaderFormat { dataset: String, message: String },

    /// One or more rows failed structural or field validation
    #[error("Validation failed for dataset '{dataset}': {} row error(s)", errors.len())]
    Validation {
        dataset: String,
        errors: Vec<RowError>,
    },

    /// Insertable row count outside the accepted bounds
    #[error("File must contain between {min} and {max} records, found {found}")]
    RowCount {
        dataset: String,
        found: usize,
        min: usize,
        max: usize,
    },

    /// Summary statistics could not be computed
    #[error("Failed to compute summary for dataset '{dataset}': {message}")]
    Aggregation { dataset: String, message: String },

    /// Unexpected failure while processing a dataset
    ///
    /// Display omits the underlying cause; it stays in the source chain for logging.
    #[error("An error occurred while processing dataset '{dataset}'")]
    Operational {
        dataset: String,
        #[source]
        source: Box<Error>,
    },

    /// Ingestion exceeded its configured deadline and was rolled back
    #[error("Ingestion of dataset '{dataset}' timed out after {timeout_secs}s")]
    IngestTimeout { dataset: String, timeout_secs: u64 },

    /// Processing interrupted by cancellation
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },

    /// Upload rejected before ingestion
    #[error("{message}")]
    InvalidUpload { message: String },

    /// Filter payload field could not be interpreted
    #[error("Invalid filter field '{field}' (value '{value}'): {message}")]
    InvalidFilter {
        field: String,
        value: String,
        message: String,
    },

    /// Value cannot be represented in its storage column
    #[error("Value {value} for column '{column}' is outside the storage range")]
    ValueOutOfRange { column: String, value: String },

    /// Background task failed to complete
    #[error("Background task failed: {message}")]
    TaskFailed { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a storage error with context
    pub fn storage(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid dataset name error
    pub fn invalid_dataset_name(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDatasetName {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create a header format error naming the required header
    pub fn header_format(dataset: impl Into<String>) -> Self {
        Self::HeaderFormat {
            dataset: dataset.into(),
            message: format!(
                "CSV file has an invalid format: a header row '{}' is required",
                crate::constants::HEADER_DISPLAY
            ),
        }
    }

    /// Create a validation error carrying every row error in file order
    pub fn validation(dataset: impl Into<String>, errors: Vec<RowError>) -> Self {
        Self::Validation {
            dataset: dataset.into(),
            errors,
        }
    }

    /// Create a row count bound error
    pub fn row_count(dataset: impl Into<String>, found: usize, min: usize, max: usize) -> Self {
        Self::RowCount {
            dataset: dataset.into(),
            found,
            min,
            max,
        }
    }

    /// Create an aggregation error
    pub fn aggregation(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Aggregation {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Wrap an unexpected failure with the dataset it occurred on
    pub fn operational(dataset: impl Into<String>, source: Error) -> Self {
        Self::Operational {
            dataset: dataset.into(),
            source: Box::new(source),
        }
    }

    /// Create an ingestion timeout error
    pub fn ingest_timeout(dataset: impl Into<String>, timeout_secs: u64) -> Self {
        Self::IngestTimeout {
            dataset: dataset.into(),
            timeout_secs,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Create an upload rejection error
    pub fn invalid_upload(message: impl Into<String>) -> Self {
        Self::InvalidUpload {
            message: message.into(),
        }
    }

    /// Create a field-scoped filter error
    pub fn invalid_filter(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a storage range error
    pub fn value_out_of_range(column: impl Into<String>, value: impl ToString) -> Self {
        Self::ValueOutOfRange {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Create a task failure error
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Whether the caller can fix the problem by correcting the input
    ///
    /// These errors are reported with full detail; everything else is shown
    /// to users as a single generic message.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::InvalidDatasetName { .. }
                | Self::HeaderFormat { .. }
                | Self::Validation { .. }
                | Self::RowCount { .. }
                | Self::InvalidUpload { .. }
                | Self::InvalidFilter { .. }
        )
    }

    /// Row errors carried by a validation failure, empty for other kinds
    pub fn row_errors(&self) -> &[RowError] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage {
            message: "SQLite operation failed".to_string(),
            source: error,
        }
    }
}
