//! Tests for header row recognition

use super::super::header::{
    HeaderState, classify_candidate, is_expected_header, is_header_candidate,
};

#[test]
fn test_header_candidate_is_case_insensitive_and_trimmed() {
    assert!(is_header_candidate(&["Date", "ExecutionTime", "Value"]));
    assert!(is_header_candidate(&["  DATE ", "x", "y"]));
    assert!(is_header_candidate(&["date", "", ""]));

    assert!(!is_header_candidate(&["Dates", "ExecutionTime", "Value"]));
    assert!(!is_header_candidate(&["2024-07-16T10-05-00.0000Z", "15", "1"]));
}

#[test]
fn test_expected_header_concatenates_trimmed_fields() {
    assert!(is_expected_header(&["Date", "ExecutionTime", "Value"]));
    assert!(is_expected_header(&[" date ", " executiontime", "VALUE "]));
    // Field boundaries are not significant once concatenated
    assert!(is_expected_header(&["Date", "Execution", "TimeValue"]));

    assert!(!is_expected_header(&["Date", "Execution Time", "Value"]));
    assert!(!is_expected_header(&["Date", "Duration", "Value"]));
}

#[test]
fn test_classify_candidate() {
    assert_eq!(
        classify_candidate(3, "Date;ExecutionTime;Value", &["Date", "ExecutionTime", "Value"]),
        HeaderState::Recognized { row_number: 3 }
    );

    let state = classify_candidate(1, "Date;Time;Value", &["Date", "Time", "Value"]);
    assert_eq!(
        state,
        HeaderState::Malformed {
            row_number: 1,
            line: "Date;Time;Value".to_string()
        }
    );
    assert!(state.is_decided());
    assert!(!state.is_recognized());
}

#[test]
fn test_missing_state_is_undecided() {
    assert!(!HeaderState::Missing.is_decided());
    assert!(!HeaderState::Missing.is_recognized());
}
