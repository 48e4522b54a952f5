//! Policy dispatch tests

use crate::app::models::{ErrorContext, Severity};
use crate::app::services::error_middleware::classify::ErrorCategory;
use crate::app::services::error_middleware::{handle_failure, FailureSite, PolicyAction};
use crate::config::{
    ErrorHandlingStrategy, FileNotFoundPolicy, ParseErrorPolicy, ValidationErrorPolicy,
};
use crate::Error;

fn context() -> ErrorContext {
    ErrorContext::new("test_op").with_file_path("group1/voltage.csv")
}

#[test]
fn test_default_file_not_found_warns_and_continues() {
    let strategy = ErrorHandlingStrategy::default();
    let error = Error::file_access("group1/voltage.csv", "no such file or directory");

    let decision = handle_failure(&strategy, FailureSite::FileNotFound, &error, context());
    assert_eq!(decision.action, PolicyAction::Warn);
    assert!(decision.continue_processing);
    assert!(decision.is_recovered());
    assert_eq!(decision.category, ErrorCategory::FileAccess);
    assert_eq!(decision.severity, Severity::Low);
}

#[test]
fn test_file_not_found_error_policy_escalates() {
    let mut strategy = ErrorHandlingStrategy::default();
    strategy.on_file_not_found = FileNotFoundPolicy::Error;
    let error = Error::file_access("group1/voltage.csv", "no such file or directory");

    let decision = handle_failure(&strategy, FailureSite::FileNotFound, &error, context());
    assert_eq!(decision.action, PolicyAction::Error);
    assert!(!decision.continue_processing);
}

#[test]
fn test_default_parse_error_skips_row() {
    let strategy = ErrorHandlingStrategy::default();
    let error = Error::timestamp_parsing("garbage", "no format matched");

    let decision = handle_failure(&strategy, FailureSite::ParseError, &error, context());
    assert_eq!(decision.action, PolicyAction::SkipRow);
    assert!(decision.continue_processing);
    assert_eq!(decision.category, ErrorCategory::DataParsing);
    assert_eq!(decision.severity, Severity::Medium);
}

#[test]
fn test_parse_error_skip_file_aborts_enclosing_unit() {
    let strategy =
        ErrorHandlingStrategy::default().with_parse_error_policy(ParseErrorPolicy::SkipFile);
    let error = Error::data_parsing("header mismatch");

    let decision = handle_failure(&strategy, FailureSite::ParseError, &error, context());
    assert_eq!(decision.action, PolicyAction::SkipFile);
    assert!(!decision.continue_processing);
}

#[test]
fn test_default_validation_error_marks_invalid() {
    let strategy = ErrorHandlingStrategy::default();
    let error = Error::data_validation("soc outside domain");

    let decision = handle_failure(&strategy, FailureSite::ValidationError, &error, context());
    assert_eq!(decision.action, PolicyAction::MarkInvalid);
    assert!(decision.continue_processing);
    assert_eq!(decision.category, ErrorCategory::DataValidation);
    assert_eq!(decision.severity, Severity::Low);
}

#[test]
fn test_validation_abort_policy_escalates() {
    let strategy = ErrorHandlingStrategy::default()
        .with_validation_error_policy(ValidationErrorPolicy::Abort);
    let error = Error::data_validation("soc outside domain");

    let decision = handle_failure(&strategy, FailureSite::ValidationError, &error, context());
    assert_eq!(decision.action, PolicyAction::Abort);
    assert!(!decision.continue_processing);
}

#[test]
fn test_decision_carries_context() {
    let strategy = ErrorHandlingStrategy::default();
    let error = Error::data_parsing("bad cell value");
    let ctx = context().with_row_index(17).with_column_name("cell_03");

    let decision = handle_failure(&strategy, FailureSite::ParseError, &error, ctx);
    assert_eq!(decision.context.row_index, Some(17));
    assert_eq!(decision.context.column_name.as_deref(), Some("cell_03"));
    assert_eq!(
        decision.context.file_path.as_deref(),
        Some("group1/voltage.csv")
    );
}
