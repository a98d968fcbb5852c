//! Test utilities for ingestion
//!
//! Provides a fixed clock, file builders and store helpers shared by the
//! ingestor and service tests.

use chrono::{DateTime, TimeZone, Utc};
use std::io::Cursor;
use tokio_util::sync::CancellationToken;

use super::ingestor::Ingestor;
use crate::app::models::Dataset;
use crate::app::storage::SqliteStore;
use crate::config::{Config, IngestionConfig};
use crate::Result;

mod ingestor_tests;

pub const HEADER: &str = "Date;ExecutionTime;Value";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// Helper to build file content from a header and data rows
pub fn create_test_csv(rows: &[&str]) -> String {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// `count` valid rows one minute apart with execution time and value equal to the index
pub fn generated_rows(count: usize) -> String {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut content = format!("{HEADER}\n");
    for index in 0..count {
        let timestamp = start + chrono::TimeDelta::minutes(index as i64);
        content.push_str(&format!(
            "{}.0000Z;{};{}.5000\n",
            timestamp.format("%Y-%m-%dT%H-%M-%S"),
            index,
            index
        ));
    }
    content
}

pub fn test_ingestor() -> Ingestor {
    Ingestor::new(IngestionConfig::default()).with_clock(fixed_now())
}

/// Ingest `content` into `store` with the fixed clock and no cancellation
pub fn ingest_content(store: &mut SqliteStore, name: &str, content: &str) -> Result<Dataset> {
    test_ingestor().ingest(
        store,
        name,
        Cursor::new(content.to_string()),
        &CancellationToken::new(),
    )
}

/// Configuration for a fresh on-disk database
pub fn temp_config(dir: &tempfile::TempDir) -> Config {
    Config::default()
        .with_database_path(dir.path().join("measurements.db"))
        .with_busy_timeout_ms(10_000)
}
