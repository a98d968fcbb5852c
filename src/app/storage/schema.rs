//! Table definitions and schema versioning
//!
//! Decimal columns hold values scaled by 10^4 as integers and timestamps hold
//! UTC microseconds since the Unix epoch, so ordering and extrema are exact.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::{Error, Result};

/// Schema version written to `store_meta`
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES_SQL: &str = "
    CREATE TABLE IF NOT EXISTS datasets (
        dataset_name TEXT PRIMARY KEY NOT NULL CHECK (length(dataset_name) BETWEEN 1 AND 255),
        time_span_seconds INTEGER NOT NULL,
        minimum_timestamp_us INTEGER NOT NULL,
        avg_execution_seconds REAL NOT NULL,
        avg_store_value INTEGER NOT NULL,
        median_store_value INTEGER NOT NULL,
        maximum_store_value INTEGER NOT NULL,
        minimum_store_value INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS measurements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dataset_name TEXT NOT NULL
            REFERENCES datasets(dataset_name) DEFERRABLE INITIALLY DEFERRED,
        start_timestamp_us INTEGER NOT NULL,
        execution_seconds INTEGER NOT NULL CHECK (execution_seconds >= 0),
        store_value INTEGER NOT NULL CHECK (store_value >= 0)
    );
    CREATE INDEX IF NOT EXISTS idx_measurements_dataset_time
        ON measurements (dataset_name, start_timestamp_us);
    CREATE INDEX IF NOT EXISTS idx_measurements_dataset_value
        ON measurements (dataset_name, store_value);
    CREATE INDEX IF NOT EXISTS idx_datasets_minimum_timestamp
        ON datasets (minimum_timestamp_us);";

/// Apply connection pragmas
///
/// Foreign keys are enforced; file databases use WAL so readers see the last
/// committed state while an ingestion is in flight.
pub fn apply_pragmas(connection: &Connection, busy_timeout: std::time::Duration) -> Result<()> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| Error::storage("Failed to enable foreign keys", e))?;
    connection
        .execute_batch("PRAGMA journal_mode = WAL;")
        .map_err(|e| Error::storage("Failed to set journal mode", e))?;
    connection
        .busy_timeout(busy_timeout)
        .map_err(|e| Error::storage("Failed to set busy timeout", e))?;
    Ok(())
}

/// Create the tables or check the version of an existing database
pub fn initialize_schema(connection: &mut Connection) -> Result<()> {
    let tx = connection
        .transaction()
        .map_err(|e| Error::storage("Failed to begin schema transaction", e))?;

    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|e| Error::storage("Failed to create store_meta table", e))?;

    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| Error::storage("Failed to read schema version", e))?;

    match version {
        None => {
            tx.execute_batch(CREATE_TABLES_SQL)
                .map_err(|e| Error::storage("Failed to create tables", e))?;
            tx.execute(
                "INSERT INTO store_meta (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| Error::storage("Failed to record schema version", e))?;
            info!("Initialized database schema version {}", SCHEMA_VERSION);
        }
        Some(value) if value == SCHEMA_VERSION => {
            debug!("Database schema version {} is current", value);
        }
        Some(value) => {
            return Err(Error::configuration(format!(
                "Unsupported database schema version {value}, expected {SCHEMA_VERSION}"
            )));
        }
    }

    tx.commit()
        .map_err(|e| Error::storage("Failed to commit schema", e))?;
    Ok(())
}
