//! Replace-and-recompute pipeline tests

use super::*;
use crate::Error;
use rust_decimal::Decimal;

const VALID_ROWS: [&str; 4] = [
    "2024-07-16T10-00-00.0000Z;10;10",
    "2024-07-16T10-01-00.0000Z;20;20.0000",
    "2024-07-16T10-02-00.0000Z;30;30",
    "2024-07-16T10-05-00.0000Z;40;40",
];

#[test]
fn test_ingest_valid_file() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let dataset = ingest_content(&mut store, "run.csv", &create_test_csv(&VALID_ROWS)).unwrap();

    assert_eq!(dataset.dataset_name, "run.csv");
    assert_eq!(dataset.time_span_seconds, 300);
    assert_eq!(dataset.avg_execution_seconds, 25.0);
    assert_eq!(dataset.avg_store_value, Decimal::from(25));
    assert_eq!(dataset.median_store_value, Decimal::from(25));
    assert_eq!(dataset.minimum_store_value, Decimal::from(10));
    assert_eq!(dataset.maximum_store_value, Decimal::from(40));

    let latest = store.latest_measurements("run.csv", None).unwrap();
    assert_eq!(latest.len(), 4);
    assert!(latest.windows(2).all(|w| w[0].start_timestamp <= w[1].start_timestamp));
    assert_eq!(store.get_dataset("run.csv").unwrap(), Some(dataset));
}

#[test]
fn test_reingest_replaces_rows_and_summary() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    ingest_content(&mut store, "run.csv", &create_test_csv(&VALID_ROWS)).unwrap();

    let replacement = create_test_csv(&[
        "2024-08-01T00-00-00.0000Z;5;5",
        "2024-08-01T00-00-10.0000Z;15;15",
        "2024-08-01T00-00-20.0000Z;25;25",
    ]);
    let dataset = ingest_content(&mut store, "run.csv", &replacement).unwrap();

    assert_eq!(dataset.median_store_value, Decimal::from(15));
    assert_eq!(dataset.time_span_seconds, 20);

    let latest = store.latest_measurements("run.csv", None).unwrap();
    let values: Vec<i32> = latest.iter().map(|m| m.execution_seconds).collect();
    assert_eq!(values, vec![5, 15, 25]);
}

#[test]
fn test_reingest_identical_file_is_idempotent() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = create_test_csv(&VALID_ROWS);

    let first = ingest_content(&mut store, "run.csv", &content).unwrap();
    let second = ingest_content(&mut store, "run.csv", &content).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.count_measurements("run.csv").unwrap(), 4);
}

#[test]
fn test_structural_error_rolls_back_and_keeps_previous_state() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let original = ingest_content(&mut store, "run.csv", &create_test_csv(&VALID_ROWS)).unwrap();

    let broken = create_test_csv(&[
        "2024-07-16T10-00-00.0000Z;10;99",
        "2024-01-01;5",
        "2024-07-16T10-02-00.0000Z;30;99",
    ]);
    let error = ingest_content(&mut store, "run.csv", &broken).unwrap_err();

    match &error {
        Error::Validation { dataset, errors } => {
            assert_eq!(dataset, "run.csv");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].row_number, 3);
            assert!(errors[0].is_structural());
            assert_eq!(errors[0].value, "2024-01-01;5");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(error.is_user_correctable());

    assert_eq!(store.get_dataset("run.csv").unwrap(), Some(original));
    assert_eq!(store.count_measurements("run.csv").unwrap(), 4);
}

#[test]
fn test_field_errors_are_reported_exhaustively() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = create_test_csv(&[
        "not-a-date;-1;abc",
        "2024-07-16T10-00-00.0000Z;10;10",
        "1999-12-31T23-59-59.9999Z;5;-3",
    ]);

    let error = ingest_content(&mut store, "bad.csv", &content).unwrap_err();
    let rows: Vec<usize> = error.row_errors().iter().map(|e| e.row_number).collect();

    assert_eq!(rows, vec![2, 2, 2, 4, 4]);
    assert!(store.get_dataset("bad.csv").unwrap().is_none());
    assert_eq!(store.count_measurements("bad.csv").unwrap(), 0);
}

#[test]
fn test_missing_header_fails_with_format_error() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = "2024-07-16T10-00-00.0000Z;10;10\n";

    let error = ingest_content(&mut store, "noheader.csv", content).unwrap_err();

    assert!(matches!(error, Error::HeaderFormat { .. }));
    assert!(error.to_string().contains("Date;ExecutionTime;Value"));
}

#[test]
fn test_header_error_takes_precedence_over_row_errors() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = "Date;Duration;Value\nnot-a-date;1;1\n";

    let error = ingest_content(&mut store, "wrong.csv", content).unwrap_err();
    assert!(matches!(error, Error::HeaderFormat { .. }));
}

#[test]
fn test_row_errors_take_precedence_over_row_count() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = create_test_csv(&["2024-07-16T10-00-00.0000Z;x;1"]);

    let error = ingest_content(&mut store, "x.csv", &content).unwrap_err();
    assert!(matches!(error, Error::Validation { .. }));
}

#[test]
fn test_header_only_file_fails_row_count() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let error = ingest_content(&mut store, "empty.csv", &create_test_csv(&[])).unwrap_err();

    assert!(matches!(
        error,
        Error::RowCount {
            found: 0,
            min: 1,
            max: 10_000,
            ..
        }
    ));
}

#[test]
fn test_too_many_rows_fails_without_partial_insert() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let error = ingest_content(&mut store, "big.csv", &generated_rows(10_001)).unwrap_err();

    assert!(matches!(error, Error::RowCount { found: 10_001, .. }));
    assert_eq!(store.count_measurements("big.csv").unwrap(), 0);
}

#[test]
fn test_maximum_row_count_is_accepted() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let dataset = ingest_content(&mut store, "max.csv", &generated_rows(10_000)).unwrap();

    assert_eq!(store.count_measurements("max.csv").unwrap(), 10_000);
    assert_eq!(dataset.time_span_seconds, 9_999 * 60);
    assert_eq!(dataset.median_store_value, Decimal::new(50_000_000, 4));
}

#[test]
fn test_cancelled_ingestion_rolls_back() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let original = ingest_content(&mut store, "run.csv", &create_test_csv(&VALID_ROWS)).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let error = test_ingestor()
        .ingest(
            &mut store,
            "run.csv",
            Cursor::new(create_test_csv(&VALID_ROWS[..1])),
            &cancel,
        )
        .unwrap_err();

    assert!(matches!(error, Error::ProcessingInterrupted { .. }));
    assert_eq!(store.get_dataset("run.csv").unwrap(), Some(original));
}

#[test]
fn test_invalid_dataset_names() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = create_test_csv(&VALID_ROWS);

    let empty = ingest_content(&mut store, "  ", &content).unwrap_err();
    assert!(matches!(empty, Error::InvalidDatasetName { .. }));

    let long_name = format!("{}.csv", "x".repeat(252));
    let too_long = ingest_content(&mut store, &long_name, &content).unwrap_err();
    assert!(matches!(too_long, Error::InvalidDatasetName { .. }));

    let just_fits = format!("{}.csv", "x".repeat(251));
    assert!(ingest_content(&mut store, &just_fits, &content).is_ok());
}

#[test]
fn test_crlf_and_bom_input() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let content = "\u{feff}Date;ExecutionTime;Value\r\n2024-07-16T10-00-00.0000Z;10;1.23456\r\n";

    let dataset = ingest_content(&mut store, "win.csv", content).unwrap();

    assert_eq!(dataset.maximum_store_value, Decimal::new(12_346, 4));
}

#[test]
fn test_invalid_utf8_is_a_field_error() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let mut bytes = b"Date;ExecutionTime;Value\n2024-07-16T10-00-00.0000Z;10;".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);

    let error = test_ingestor()
        .ingest(
            &mut store,
            "bin.csv",
            Cursor::new(bytes),
            &CancellationToken::new(),
        )
        .unwrap_err();

    assert_eq!(error.row_errors().len(), 1);
    assert_eq!(error.row_errors()[0].row_number, 2);
}
