//! Store-backed queries agree with the in-memory filter

use super::*;
use crate::app::models::NewMeasurement;
use crate::app::services::dataset_query::{DatasetFilter, latest_measurements, query_datasets};
use crate::app::storage::SqliteStore;

fn seeded_store() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let tx = store.begin().unwrap();
    for dataset in sample_datasets() {
        tx.upsert_summary(&dataset).unwrap();
    }
    tx.commit().unwrap();
    store
}

fn names(datasets: &[Dataset]) -> Vec<&str> {
    datasets.iter().map(|d| d.dataset_name.as_str()).collect()
}

#[test]
fn test_store_query_matches_in_memory_filter() {
    let store = seeded_store();
    let filters = [
        DatasetFilter::new(),
        DatasetFilter::new().with_dataset_name("gamma.csv"),
        DatasetFilter::new().with_avg_execution_seconds(Some(16.0), None),
        DatasetFilter::new().with_minimum_timestamp(None, Some(day(10))),
        DatasetFilter::new().with_avg_store_value(Some(Decimal::new(5, 4)), Some(Decimal::from(100))),
        DatasetFilter::new().with_time_span_seconds(Some(3_600), None),
    ];

    for filter in &filters {
        let from_store = query_datasets(&store, filter).unwrap();
        let expected: Vec<Dataset> = sample_datasets()
            .into_iter()
            .filter(|dataset| filter_matches(filter, dataset))
            .collect();
        assert_eq!(from_store, expected, "filter {:?}", filter);
    }
}

#[test]
fn test_decimal_bound_beyond_storage_scale() {
    let store = seeded_store();

    // 0.00049 rounds up to 0.0005 for a lower bound
    let filter = DatasetFilter::new().with_avg_store_value(Some(Decimal::new(49, 5)), None);
    assert_eq!(
        names(&query_datasets(&store, &filter).unwrap()),
        vec!["alpha.csv", "beta.csv", "gamma.csv"]
    );

    // 0.00051 rounds down to 0.0005 for an upper bound
    let filter = DatasetFilter::new().with_avg_store_value(None, Some(Decimal::new(51, 5)));
    assert_eq!(names(&query_datasets(&store, &filter).unwrap()), vec!["gamma.csv"]);
}

#[test]
fn test_latest_measurements_for_unknown_dataset_is_empty() {
    let store = seeded_store();
    assert!(latest_measurements(&store, "nope.csv", None).unwrap().is_empty());
}

#[test]
fn test_latest_measurements_ordered_by_timestamp() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let rows: Vec<NewMeasurement> = [20, 5, 12]
        .into_iter()
        .map(|d| NewMeasurement {
            start_timestamp: day(d),
            execution_seconds: d as i32,
            store_value: Decimal::from(d),
        })
        .collect();

    let tx = store.begin().unwrap();
    tx.insert_measurements("a.csv", &rows).unwrap();
    tx.upsert_summary(&create_test_dataset("a.csv", day(5), 1.0, Decimal::ONE, 0))
        .unwrap();
    tx.commit().unwrap();

    let latest = latest_measurements(&store, "a.csv", None).unwrap();
    let seconds: Vec<i32> = latest.iter().map(|m| m.execution_seconds).collect();
    assert_eq!(seconds, vec![5, 12, 20]);

    let first_two = latest_measurements(&store, "a.csv", Some(2)).unwrap();
    assert_eq!(first_two.len(), 2);
}
