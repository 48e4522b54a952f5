//! Categorization and severity table tests

use crate::app::models::Severity;
use crate::app::services::error_middleware::classify::{
    categorize, is_transient, severity, ErrorCategory,
};
use crate::Error;

#[test]
fn test_file_access_markers() {
    assert_eq!(
        categorize("No such file or directory"),
        ErrorCategory::FileAccess
    );
    assert_eq!(categorize("file not found"), ErrorCategory::FileAccess);
    assert_eq!(
        categorize("Permission denied (os error 13)"),
        ErrorCategory::FileAccess
    );
}

#[test]
fn test_file_format_markers() {
    assert_eq!(
        categorize("missing header row in export"),
        ErrorCategory::FileFormat
    );
    assert_eq!(
        categorize("unexpected delimiter in line 3"),
        ErrorCategory::FileFormat
    );
}

#[test]
fn test_data_parsing_markers() {
    assert_eq!(
        categorize("failed to parse cell value"),
        ErrorCategory::DataParsing
    );
    assert_eq!(
        categorize("invalid digit found in string"),
        ErrorCategory::DataParsing
    );
    assert_eq!(
        categorize("Timestamp parsing error for value 'x'"),
        ErrorCategory::DataParsing
    );
}

#[test]
fn test_data_validation_markers() {
    assert_eq!(
        categorize("Data validation error: soc out of domain"),
        ErrorCategory::DataValidation
    );
    assert_eq!(categorize("value out of range"), ErrorCategory::DataValidation);
}

#[test]
fn test_memory_markers() {
    assert_eq!(
        categorize("memory allocation of 8 bytes failed"),
        ErrorCategory::MemoryError
    );
    assert_eq!(categorize("capacity overflow"), ErrorCategory::MemoryError);
}

#[test]
fn test_unrecognized_and_empty_fall_back_to_system() {
    assert_eq!(categorize("something odd happened"), ErrorCategory::SystemError);
    assert_eq!(categorize(""), ErrorCategory::SystemError);
}

#[test]
fn test_crate_errors_classify_by_display_text() {
    let error = Error::data_validation("soc outside domain");
    assert_eq!(categorize(&error.to_string()), ErrorCategory::DataValidation);

    let error = Error::timestamp_parsing("garbage", "no format matched");
    assert_eq!(categorize(&error.to_string()), ErrorCategory::DataParsing);

    let error = Error::file_format("a.csv", "missing header");
    assert_eq!(categorize(&error.to_string()), ErrorCategory::FileFormat);
}

#[test]
fn test_severity_table() {
    assert_eq!(
        severity(ErrorCategory::MemoryError, "memory allocation failed"),
        Severity::Critical
    );
    assert_eq!(
        severity(ErrorCategory::SystemError, "something odd"),
        Severity::High
    );
    assert_eq!(
        severity(ErrorCategory::FileAccess, "permission denied"),
        Severity::High
    );
    assert_eq!(
        severity(ErrorCategory::FileAccess, "file not found"),
        Severity::Low
    );
    assert_eq!(
        severity(ErrorCategory::FileFormat, "missing header"),
        Severity::Medium
    );
    assert_eq!(
        severity(ErrorCategory::DataParsing, "parse failure"),
        Severity::Medium
    );
    assert_eq!(
        severity(ErrorCategory::DataValidation, "validation failure"),
        Severity::Low
    );
}

#[test]
fn test_transient_markers() {
    assert!(is_transient("connection timeout after 30s"));
    assert!(is_transient("network unreachable"));
    assert!(is_transient("resource temporarily unavailable"));
    assert!(!is_transient("file not found"));
    assert!(!is_transient("parse failure"));
}

#[test]
fn test_category_display() {
    assert_eq!(ErrorCategory::FileAccess.to_string(), "file_access");
    assert_eq!(ErrorCategory::SystemError.to_string(), "system_error");
}
