//! Read operations over the dataset store

use tracing::debug;

use super::filter::DatasetFilter;
use crate::app::models::{Dataset, Measurement};
use crate::app::storage::SqliteStore;
use crate::Result;

/// Return every dataset summary satisfying all present bounds, ordered by name
///
/// An empty result is a normal outcome.
pub fn query_datasets(store: &SqliteStore, filter: &DatasetFilter) -> Result<Vec<Dataset>> {
    let datasets = store.query_datasets(filter)?;
    debug!(
        "Dataset query with {} predicate(s) matched {} dataset(s)",
        filter.predicates().len(),
        datasets.len()
    );
    Ok(datasets)
}

/// Return a dataset's measurements in ascending timestamp order
///
/// Unknown names and datasets without rows both yield an empty sequence.
pub fn latest_measurements(
    store: &SqliteStore,
    dataset_name: &str,
    limit: Option<usize>,
) -> Result<Vec<Measurement>> {
    let measurements = store.latest_measurements(dataset_name, limit)?;
    debug!(
        "Loaded {} measurement(s) for dataset '{}'",
        measurements.len(),
        dataset_name
    );
    Ok(measurements)
}
