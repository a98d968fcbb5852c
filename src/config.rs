//! Configuration management and validation.
//!
//! Provides configuration structures for the storage backend and the
//! ingestion policy, loaded in layers: defaults, an optional JSON file,
//! environment variables, then command-line overrides.

use crate::constants::{
    APP_DIR_NAME, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DATABASE_FILE, ENV_BUSY_TIMEOUT_MS,
    ENV_DATABASE_PATH, ENV_INGEST_TIMEOUT_SECS, MAX_ROWS, MIN_ROWS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// SQLite storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// How long a connection waits on a locked database before failing (ms)
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StorageConfig {
    /// Busy timeout as a [`Duration`]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Ingestion policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Minimum insertable rows per file
    pub min_rows: usize,

    /// Maximum insertable rows per file
    pub max_rows: usize,

    /// Deadline for a whole ingestion, `None` for no limit
    pub timeout_secs: Option<u64>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            min_rows: MIN_ROWS,
            max_rows: MAX_ROWS,
            timeout_secs: None,
        }
    }
}

impl IngestionConfig {
    /// Ingestion timeout as a [`Duration`]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Global configuration for the measurement summary service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
}

impl Config {
    /// Create configuration with a custom database path
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.database_path = path.into();
        self
    }

    /// Create configuration with a custom busy timeout
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.storage.busy_timeout_ms = busy_timeout_ms;
        self
    }

    /// Create configuration with custom row bounds
    pub fn with_row_bounds(mut self, min_rows: usize, max_rows: usize) -> Self {
        self.ingestion.min_rows = min_rows;
        self.ingestion.max_rows = max_rows;
        self
    }

    /// Create configuration with an ingestion deadline
    pub fn with_ingest_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.ingestion.timeout_secs = Some(timeout_secs);
        self
    }

    /// Load configuration from a JSON file, falling back to defaults for missing keys
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read config file {}", path.display()),
                e,
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Invalid config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration using the layered approach (defaults -> file -> environment)
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        debug!("Layered configuration: {:?}", config);

        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.trim().is_empty()) {
            self.storage.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            self.storage.busy_timeout_ms = parse_env_number(ENV_BUSY_TIMEOUT_MS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_INGEST_TIMEOUT_SECS) {
            self.ingestion.timeout_secs = Some(parse_env_number(ENV_INGEST_TIMEOUT_SECS, &raw)?);
        }

        Ok(())
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::configuration("Database path cannot be empty"));
        }

        if self.ingestion.min_rows == 0 {
            return Err(Error::configuration("Minimum row count must be at least 1"));
        }

        if self.ingestion.max_rows < self.ingestion.min_rows {
            return Err(Error::configuration(format!(
                "Maximum row count {} is below minimum row count {}",
                self.ingestion.max_rows, self.ingestion.min_rows
            )));
        }

        if self.ingestion.timeout_secs == Some(0) {
            return Err(Error::configuration("Ingestion timeout must be positive"));
        }

        Ok(())
    }
}

/// Default database location under the platform data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}

fn parse_env_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        Error::configuration(format!(
            "Environment variable {} must be a non-negative integer, got '{}': {}",
            key, raw, e
        ))
    })
}
