//! In-memory filter semantics

use super::*;
use crate::app::services::dataset_query::{
    Comparison, DatasetFilter, FilterValue, InclusiveRange, SummaryField,
};

fn matching_names(filter: &DatasetFilter) -> Vec<String> {
    sample_datasets()
        .into_iter()
        .filter(|dataset| filter_matches(filter, dataset))
        .map(|dataset| dataset.dataset_name)
        .collect()
}

#[test]
fn test_empty_filter_matches_everything() {
    let filter = DatasetFilter::new();

    assert!(filter.predicates().is_empty());
    assert_eq!(matching_names(&filter).len(), 3);
}

#[test]
fn test_empty_dataset_name_imposes_no_constraint() {
    let filter = DatasetFilter::new().with_dataset_name("");

    assert!(filter.predicates().is_empty());
    assert_eq!(matching_names(&filter).len(), 3);
}

#[test]
fn test_min_avg_execution_seconds() {
    let filter = DatasetFilter::new().with_avg_execution_seconds(Some(16.0), None);
    assert_eq!(matching_names(&filter), vec!["beta.csv", "gamma.csv"]);
}

#[test]
fn test_bounds_are_inclusive() {
    let filter = DatasetFilter::new()
        .with_time_span_seconds(Some(60), Some(3_600))
        .with_minimum_timestamp(Some(day(1)), Some(day(10)));

    assert_eq!(matching_names(&filter), vec!["alpha.csv", "beta.csv"]);
}

#[test]
fn test_predicates_are_anded() {
    let filter = DatasetFilter::new()
        .with_dataset_name("alpha.csv")
        .with_avg_store_value(Some(Decimal::from(200)), None);

    assert!(matching_names(&filter).is_empty());
}

#[test]
fn test_inverted_range_is_empty_not_an_error() {
    let filter = DatasetFilter::new().with_avg_execution_seconds(Some(20.0), Some(10.0));
    assert!(matching_names(&filter).is_empty());
}

#[test]
fn test_predicates_follow_present_bounds() {
    let filter = DatasetFilter::new()
        .with_dataset_name("beta.csv")
        .with_avg_store_value(None, Some(Decimal::from(300)));

    let predicates = filter.predicates();
    assert_eq!(predicates.len(), 2);
    assert_eq!(predicates[0].field, SummaryField::DatasetName);
    assert_eq!(predicates[0].comparison, Comparison::Equal);
    assert_eq!(predicates[1].field, SummaryField::AvgStoreValue);
    assert_eq!(predicates[1].comparison, Comparison::AtMost);
    assert_eq!(predicates[1].value, FilterValue::Decimal(Decimal::from(300)));
}

#[test]
fn test_filter_deserializes_from_partial_json() {
    let filter: DatasetFilter = serde_json::from_str(
        r#"{"avg_execution_seconds": {"min": 16.0}, "time_span_seconds": {"max": 100}}"#,
    )
    .unwrap();

    assert_eq!(filter.avg_execution_seconds.min, Some(16.0));
    assert!(filter.avg_execution_seconds.max.is_none());
    assert_eq!(filter.time_span_seconds.max, Some(100));
    assert_eq!(filter.minimum_timestamp, InclusiveRange::default());
    assert_eq!(matching_names(&filter), Vec::<String>::new());
}
