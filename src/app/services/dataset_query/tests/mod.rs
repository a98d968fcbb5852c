//! Test utilities for dataset queries

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::app::models::Dataset;
use crate::app::services::dataset_query::{Comparison, DatasetFilter, FilterValue, Predicate};

mod filter_tests;
mod lookup_tests;

/// Helper to build a summary with the fields the filters look at
pub fn create_test_dataset(
    name: &str,
    minimum_timestamp: DateTime<Utc>,
    avg_execution_seconds: f64,
    avg_store_value: Decimal,
    time_span_seconds: i64,
) -> Dataset {
    Dataset {
        dataset_name: name.to_string(),
        time_span_seconds,
        minimum_timestamp,
        avg_execution_seconds,
        avg_store_value,
        median_store_value: avg_store_value,
        maximum_store_value: avg_store_value,
        minimum_store_value: avg_store_value,
    }
}

pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
}

/// Three summaries with distinct values on every filterable field
pub fn sample_datasets() -> Vec<Dataset> {
    vec![
        create_test_dataset("alpha.csv", day(1), 15.0, Decimal::new(1_000_000, 4), 60),
        create_test_dataset("beta.csv", day(10), 18.0, Decimal::new(2_500_000, 4), 3_600),
        create_test_dataset("gamma.csv", day(20), 30.5, Decimal::new(5, 4), 86_400),
    ]
}

fn holds<T: PartialOrd + ?Sized>(comparison: Comparison, actual: &T, bound: &T) -> bool {
    match comparison {
        Comparison::Equal => actual == bound,
        Comparison::AtLeast => actual >= bound,
        Comparison::AtMost => actual <= bound,
    }
}

fn predicate_matches(predicate: &Predicate, dataset: &Dataset) -> bool {
    let comparison = predicate.comparison;
    match &predicate.value {
        FilterValue::Text(bound) => {
            holds(comparison, dataset.dataset_name.as_str(), bound.as_str())
        }
        FilterValue::Timestamp(bound) => holds(comparison, &dataset.minimum_timestamp, bound),
        FilterValue::Float(bound) => holds(comparison, &dataset.avg_execution_seconds, bound),
        FilterValue::Decimal(bound) => holds(comparison, &dataset.avg_store_value, bound),
        FilterValue::Integer(bound) => holds(comparison, &dataset.time_span_seconds, bound),
    }
}

/// Evaluate a filter against a summary in memory
pub fn filter_matches(filter: &DatasetFilter, dataset: &Dataset) -> bool {
    filter
        .predicates()
        .iter()
        .all(|predicate| predicate_matches(predicate, dataset))
}
