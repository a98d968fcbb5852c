//! Summary recomputation inside an open transaction

use tracing::{debug, error};

use super::percentile::{continuous_percentile, mean};
use crate::app::models::Dataset;
use crate::app::storage::StoreTransaction;
use crate::constants::MEDIAN_PERCENTILE;
use crate::{Error, Result};

/// Compute and upsert the summary of a dataset from its persisted rows
///
/// Failures of the statistics query or the order-statistic scan, and a
/// summary that cannot be derived, are reported as [`Error::Aggregation`]
/// naming the dataset. Writing the summary propagates storage errors unchanged.
pub fn recompute(tx: &StoreTransaction<'_>, dataset_name: &str) -> Result<Dataset> {
    let aggregates = tx
        .measurement_aggregates(dataset_name)
        .map_err(|e| {
            error!("Statistics query failed for dataset '{}': {}", dataset_name, e);
            Error::aggregation(dataset_name, "error computing summary statistics")
        })?
        .ok_or_else(|| Error::aggregation(dataset_name, "no measurements are persisted"))?;

    let values = tx.ordered_store_values(dataset_name).map_err(|e| {
        error!("Median scan failed for dataset '{}': {}", dataset_name, e);
        Error::aggregation(dataset_name, "error computing median")
    })?;
    if values.len() != aggregates.count {
        return Err(Error::aggregation(
            dataset_name,
            format!(
                "store value scan returned {} rows, expected {}",
                values.len(),
                aggregates.count
            ),
        ));
    }

    let median_store_value = continuous_percentile(&values, MEDIAN_PERCENTILE).ok_or_else(|| {
        error!("Median computation failed for dataset '{}'", dataset_name);
        Error::aggregation(dataset_name, "median could not be computed")
    })?;
    let avg_store_value = mean(&values)
        .ok_or_else(|| Error::aggregation(dataset_name, "average store value overflowed"))?;

    let dataset = Dataset {
        dataset_name: dataset_name.to_string(),
        time_span_seconds: (aggregates.latest_timestamp - aggregates.earliest_timestamp)
            .num_seconds(),
        minimum_timestamp: aggregates.earliest_timestamp,
        avg_execution_seconds: aggregates.execution_seconds_sum as f64 / aggregates.count as f64,
        avg_store_value,
        median_store_value,
        maximum_store_value: aggregates.maximum_store_value,
        minimum_store_value: aggregates.minimum_store_value,
    };

    tx.upsert_summary(&dataset)?;
    debug!(
        "Recomputed summary for '{}' over {} measurement(s)",
        dataset_name, aggregates.count
    );
    Ok(dataset)
}
