//! SQLite-backed store for measurements and dataset summaries

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params,
    params_from_iter,
};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::codec::{
    decimal_bound_to_scaled, decimal_to_scaled, micros_to_timestamp, scaled_to_decimal,
    timestamp_to_micros,
};
use super::schema::{apply_pragmas, initialize_schema};
use crate::app::models::{Dataset, Measurement, NewMeasurement};
use crate::app::services::dataset_query::{DatasetFilter, FilterValue, Predicate};
use crate::config::StorageConfig;
use crate::{Error, Result};

const DATASET_COLUMNS: &str = "dataset_name, time_span_seconds, minimum_timestamp_us, \
     avg_execution_seconds, avg_store_value, median_store_value, maximum_store_value, \
     minimum_store_value";

const MEASUREMENT_COLUMNS: &str =
    "id, dataset_name, start_timestamp_us, execution_seconds, store_value";

/// Owner of one SQLite connection
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open (and if needed create) the database described by `config`
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let path = &config.database_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(
                    format!("Failed to create database directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let connection = Connection::open(path).map_err(|e| {
            Error::storage(format!("Failed to open database {}", path.display()), e)
        })?;
        debug!("Opened database {}", path.display());

        Self::from_connection(connection, config)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()
            .map_err(|e| Error::storage("Failed to open in-memory database", e))?;
        Self::from_connection(connection, &StorageConfig::default())
    }

    fn from_connection(mut connection: Connection, config: &StorageConfig) -> Result<Self> {
        apply_pragmas(&connection, config.busy_timeout())?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Begin an IMMEDIATE transaction
    ///
    /// The write lock is taken up front, so a competing writer waits for the
    /// busy timeout instead of failing halfway through.
    pub fn begin(&mut self) -> Result<StoreTransaction<'_>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| Error::storage("Failed to begin transaction", e))?;
        trace!("Transaction started");
        Ok(StoreTransaction { tx })
    }

    /// Dataset summaries matching every predicate of `filter`, ordered by name
    pub fn query_datasets(&self, filter: &DatasetFilter) -> Result<Vec<Dataset>> {
        let predicates = filter.predicates();
        let mut sql = format!("SELECT {DATASET_COLUMNS} FROM datasets");
        let mut values = Vec::with_capacity(predicates.len());

        for (index, predicate) in predicates.iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!(
                "{} {} ?{}",
                predicate.field.column(),
                predicate.comparison.operator(),
                index + 1
            ));
            values.push(predicate_value(predicate));
        }
        sql.push_str(" ORDER BY dataset_name");
        trace!("Dataset query: {}", sql);

        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| Error::storage("Failed to prepare dataset query", e))?;
        let rows = stmt
            .query_map(params_from_iter(values), DatasetRow::from_row)
            .map_err(|e| Error::storage("Failed to query datasets", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage("Failed to read dataset row", e))?;

        rows.into_iter().map(DatasetRow::into_dataset).collect()
    }

    /// Summary for one dataset, if it exists
    pub fn get_dataset(&self, dataset_name: &str) -> Result<Option<Dataset>> {
        let row = self
            .connection
            .query_row(
                &format!("SELECT {DATASET_COLUMNS} FROM datasets WHERE dataset_name = ?1"),
                params![dataset_name],
                DatasetRow::from_row,
            )
            .optional()
            .map_err(|e| Error::storage("Failed to load dataset", e))?;

        row.map(DatasetRow::into_dataset).transpose()
    }

    /// Measurements of a dataset ordered by ascending start timestamp
    ///
    /// Rows sharing a timestamp keep insertion order. `None` returns all rows.
    pub fn latest_measurements(
        &self,
        dataset_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Measurement>> {
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));

        let mut stmt = self
            .connection
            .prepare_cached(&format!(
                "SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE dataset_name = ?1 \
                 ORDER BY start_timestamp_us, id LIMIT ?2"
            ))
            .map_err(|e| Error::storage("Failed to prepare measurement query", e))?;
        let rows = stmt
            .query_map(params![dataset_name, limit], MeasurementRow::from_row)
            .map_err(|e| Error::storage("Failed to query measurements", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::storage("Failed to read measurement row", e))?;

        rows.into_iter().map(MeasurementRow::into_measurement).collect()
    }

    /// Number of persisted measurements for a dataset
    pub fn count_measurements(&self, dataset_name: &str) -> Result<usize> {
        count_measurements(&self.connection, dataset_name)
    }
}

/// Rows removed by [`StoreTransaction::delete_dataset`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    pub measurements: usize,
    pub summaries: usize,
}

/// Streaming-computable aggregates over a dataset's persisted measurements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementAggregates {
    pub count: usize,
    pub earliest_timestamp: DateTime<Utc>,
    pub latest_timestamp: DateTime<Utc>,
    pub execution_seconds_sum: i64,
    pub minimum_store_value: Decimal,
    pub maximum_store_value: Decimal,
}

/// An open write transaction
///
/// Dropping it without [`commit`](Self::commit) rolls back every change.
#[derive(Debug)]
pub struct StoreTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl StoreTransaction<'_> {
    /// Delete a dataset's measurements, then its summary
    pub fn delete_dataset(&self, dataset_name: &str) -> Result<DeletedRows> {
        let measurements = self
            .tx
            .execute(
                "DELETE FROM measurements WHERE dataset_name = ?1",
                params![dataset_name],
            )
            .map_err(|e| Error::storage("Failed to delete measurements", e))?;
        let summaries = self
            .tx
            .execute(
                "DELETE FROM datasets WHERE dataset_name = ?1",
                params![dataset_name],
            )
            .map_err(|e| Error::storage("Failed to delete dataset summary", e))?;

        debug!(
            "Deleted {} measurement(s) and {} summary row(s) for '{}'",
            measurements, summaries, dataset_name
        );
        Ok(DeletedRows {
            measurements,
            summaries,
        })
    }

    /// Insert a batch of validated rows for a dataset
    pub fn insert_measurements(
        &self,
        dataset_name: &str,
        measurements: &[NewMeasurement],
    ) -> Result<usize> {
        let mut stmt = self
            .tx
            .prepare_cached(
                "INSERT INTO measurements \
                 (dataset_name, start_timestamp_us, execution_seconds, store_value) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| Error::storage("Failed to prepare measurement insert", e))?;

        for measurement in measurements {
            let store_value = decimal_to_scaled(measurement.store_value).ok_or_else(|| {
                Error::value_out_of_range("store_value", measurement.store_value)
            })?;
            stmt.execute(params![
                dataset_name,
                timestamp_to_micros(&measurement.start_timestamp),
                measurement.execution_seconds,
                store_value,
            ])
            .map_err(|e| Error::storage("Failed to insert measurement", e))?;
        }

        debug!(
            "Inserted {} measurement(s) for '{}'",
            measurements.len(),
            dataset_name
        );
        Ok(measurements.len())
    }

    /// Count, extrema and execution-time sum, or `None` for a dataset without rows
    pub fn measurement_aggregates(&self, dataset_name: &str) -> Result<Option<MeasurementAggregates>> {
        let raw = self
            .tx
            .query_row(
                "SELECT COUNT(*), MIN(start_timestamp_us), MAX(start_timestamp_us), \
                 SUM(execution_seconds), MIN(store_value), MAX(store_value) \
                 FROM measurements WHERE dataset_name = ?1",
                params![dataset_name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                },
            )
            .map_err(|e| Error::storage("Failed to compute measurement aggregates", e))?;

        let (count, Some(earliest), Some(latest), Some(execution_sum), Some(min), Some(max)) = raw
        else {
            return Ok(None);
        };
        if count == 0 {
            return Ok(None);
        }

        Ok(Some(MeasurementAggregates {
            count: usize::try_from(count).unwrap_or_default(),
            earliest_timestamp: micros_to_timestamp(earliest)?,
            latest_timestamp: micros_to_timestamp(latest)?,
            execution_seconds_sum: execution_sum,
            minimum_store_value: scaled_to_decimal(min),
            maximum_store_value: scaled_to_decimal(max),
        }))
    }

    /// Every store value of a dataset in ascending order
    pub fn ordered_store_values(&self, dataset_name: &str) -> Result<Vec<Decimal>> {
        let mut stmt = self
            .tx
            .prepare_cached(
                "SELECT store_value FROM measurements WHERE dataset_name = ?1 \
                 ORDER BY store_value",
            )
            .map_err(|e| Error::storage("Failed to prepare store value scan", e))?;

        stmt.query_map(params![dataset_name], |row| row.get::<_, i64>(0))
            .map_err(|e| Error::storage("Failed to scan store values", e))?
            .map(|value| {
                value
                    .map(scaled_to_decimal)
                    .map_err(|e| Error::storage("Failed to read store value", e))
            })
            .collect()
    }

    /// Create or overwrite the summary row of a dataset
    pub fn upsert_summary(&self, dataset: &Dataset) -> Result<()> {
        let scaled = |column: &str, value: Decimal| {
            decimal_to_scaled(value).ok_or_else(|| Error::value_out_of_range(column, value))
        };

        self.tx
            .execute(
                "INSERT INTO datasets (dataset_name, time_span_seconds, minimum_timestamp_us, \
                 avg_execution_seconds, avg_store_value, median_store_value, \
                 maximum_store_value, minimum_store_value) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT(dataset_name) DO UPDATE SET \
                 time_span_seconds = excluded.time_span_seconds, \
                 minimum_timestamp_us = excluded.minimum_timestamp_us, \
                 avg_execution_seconds = excluded.avg_execution_seconds, \
                 avg_store_value = excluded.avg_store_value, \
                 median_store_value = excluded.median_store_value, \
                 maximum_store_value = excluded.maximum_store_value, \
                 minimum_store_value = excluded.minimum_store_value",
                params![
                    dataset.dataset_name,
                    dataset.time_span_seconds,
                    timestamp_to_micros(&dataset.minimum_timestamp),
                    dataset.avg_execution_seconds,
                    scaled("avg_store_value", dataset.avg_store_value)?,
                    scaled("median_store_value", dataset.median_store_value)?,
                    scaled("maximum_store_value", dataset.maximum_store_value)?,
                    scaled("minimum_store_value", dataset.minimum_store_value)?,
                ],
            )
            .map_err(|e| Error::storage("Failed to write dataset summary", e))?;

        debug!("Wrote summary for '{}'", dataset.dataset_name);
        Ok(())
    }

    /// Run raw SQL inside the transaction, bypassing the typed writers
    #[cfg(test)]
    pub(crate) fn execute_unchecked(&self, sql: &str) -> Result<()> {
        self.tx
            .execute_batch(sql)
            .map_err(|e| Error::storage("Failed to execute raw statement", e))
    }

    /// Commit all changes
    pub fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| Error::storage("Failed to commit transaction", e))?;
        trace!("Transaction committed");
        Ok(())
    }

    /// Discard all changes
    pub fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .map_err(|e| Error::storage("Failed to roll back transaction", e))?;
        trace!("Transaction rolled back");
        Ok(())
    }
}

fn count_measurements(connection: &Connection, dataset_name: &str) -> Result<usize> {
    let count: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM measurements WHERE dataset_name = ?1",
            params![dataset_name],
            |row| row.get(0),
        )
        .map_err(|e| Error::storage("Failed to count measurements", e))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn predicate_value(predicate: &Predicate) -> Value {
    match &predicate.value {
        FilterValue::Text(text) => Value::Text(text.clone()),
        FilterValue::Timestamp(timestamp) => Value::Integer(timestamp_to_micros(timestamp)),
        FilterValue::Float(value) => Value::Real(*value),
        FilterValue::Decimal(value) => {
            Value::Integer(decimal_bound_to_scaled(*value, predicate.comparison))
        }
        FilterValue::Integer(value) => Value::Integer(*value),
    }
}

struct DatasetRow {
    dataset_name: String,
    time_span_seconds: i64,
    minimum_timestamp_us: i64,
    avg_execution_seconds: f64,
    avg_store_value: i64,
    median_store_value: i64,
    maximum_store_value: i64,
    minimum_store_value: i64,
}

impl DatasetRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            dataset_name: row.get(0)?,
            time_span_seconds: row.get(1)?,
            minimum_timestamp_us: row.get(2)?,
            avg_execution_seconds: row.get(3)?,
            avg_store_value: row.get(4)?,
            median_store_value: row.get(5)?,
            maximum_store_value: row.get(6)?,
            minimum_store_value: row.get(7)?,
        })
    }

    fn into_dataset(self) -> Result<Dataset> {
        Ok(Dataset {
            dataset_name: self.dataset_name,
            time_span_seconds: self.time_span_seconds,
            minimum_timestamp: micros_to_timestamp(self.minimum_timestamp_us)?,
            avg_execution_seconds: self.avg_execution_seconds,
            avg_store_value: scaled_to_decimal(self.avg_store_value),
            median_store_value: scaled_to_decimal(self.median_store_value),
            maximum_store_value: scaled_to_decimal(self.maximum_store_value),
            minimum_store_value: scaled_to_decimal(self.minimum_store_value),
        })
    }
}

struct MeasurementRow {
    id: i64,
    dataset_name: String,
    start_timestamp_us: i64,
    execution_seconds: i32,
    store_value: i64,
}

impl MeasurementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            dataset_name: row.get(1)?,
            start_timestamp_us: row.get(2)?,
            execution_seconds: row.get(3)?,
            store_value: row.get(4)?,
        })
    }

    fn into_measurement(self) -> Result<Measurement> {
        Ok(Measurement {
            id: self.id,
            dataset_name: self.dataset_name,
            start_timestamp: micros_to_timestamp(self.start_timestamp_us)?,
            execution_seconds: self.execution_seconds,
            store_value: scaled_to_decimal(self.store_value),
        })
    }
}
