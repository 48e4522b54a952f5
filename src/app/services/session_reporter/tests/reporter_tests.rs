//! Session reporter arena tests

use crate::app::models::{ErrorContext, QualityReport, Severity, UnitType, ValidationStats};
use crate::app::services::session_reporter::{FileStatus, SessionReporter};
use crate::Error;

fn quality_fixture() -> QualityReport {
    QualityReport {
        overall_score: 0.95,
        completeness: 1.0,
        accuracy: 0.9,
        consistency: 1.0,
        timeliness: 0.9,
        anomaly_count: 2,
        recommendations: vec!["Timeliness below 90%: review transmission intervals".to_string()],
    }
}

#[test]
fn test_session_lifecycle() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);
    assert_eq!(reporter.active_session_count(), 1);

    reporter
        .record_file_processed(&session_id, "bank1.csv")
        .unwrap();
    reporter
        .record_file_skipped(&session_id, "bank2.csv", "empty file")
        .unwrap();
    reporter
        .record_file_failed(&session_id, "bank3.csv", "missing header")
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    assert_eq!(reporter.active_session_count(), 0);

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.total_files_scanned, 3);
    assert!(report.finished_at.is_some());
    assert_eq!(report.file_outcomes.len(), 3);
    assert_eq!(report.file_outcomes[0].status, FileStatus::Processed);
}

#[test]
fn test_failed_file_synthesizes_error() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Group);

    reporter
        .record_file_failed(&session_id, "group1/voltage.csv", "missing header")
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("missing header"));
    assert_eq!(
        report.errors[0].context.file_path.as_deref(),
        Some("group1/voltage.csv")
    );
}

#[test]
fn test_errors_and_warnings_recorded_with_context() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);

    reporter
        .record_error(
            &session_id,
            "parse failure in row 17",
            Severity::Medium,
            ErrorContext::new("transform_wide")
                .with_row_index(17)
                .with_column_name("cell_03"),
        )
        .unwrap();
    reporter
        .record_warning(
            &session_id,
            "gap of 3.0h between points",
            Severity::Low,
            ErrorContext::new("validate_data"),
        )
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.errors[0].context.row_index, Some(17));
}

#[test]
fn test_unknown_session_rejected() {
    let reporter = SessionReporter::new();
    let result = reporter.record_file_processed("conv-bank-0-999", "a.csv");
    match result {
        Err(Error::SessionNotFound { session_id }) => {
            assert_eq!(session_id, "conv-bank-0-999");
        }
        other => panic!("Expected SessionNotFound, got {:?}", other),
    }

    assert!(reporter.finish_conversion("conv-bank-0-999").is_err());
}

#[test]
fn test_sessions_are_isolated() {
    let reporter = SessionReporter::new();
    let first = reporter.start_conversion(UnitType::Bank);
    let second = reporter.start_conversion(UnitType::Group);
    assert_ne!(first, second);

    reporter.record_file_processed(&first, "bank1.csv").unwrap();
    reporter
        .record_file_failed(&second, "group1.csv", "unreadable")
        .unwrap();

    let first_report = reporter.finish_conversion(&first).unwrap();
    let second_report = reporter.finish_conversion(&second).unwrap();

    assert_eq!(first_report.files_processed, 1);
    assert_eq!(first_report.files_failed, 0);
    assert_eq!(second_report.files_processed, 0);
    assert_eq!(second_report.files_failed, 1);
}

#[test]
fn test_sealed_report_retrievable_until_discarded() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);
    reporter
        .record_file_processed(&session_id, "bank1.csv")
        .unwrap();
    let sealed = reporter.finish_conversion(&session_id).unwrap();

    // Live state is gone; the sealed report is still retrievable
    assert!(reporter.record_file_processed(&session_id, "x.csv").is_err());
    let fetched = reporter.get_report(&session_id).unwrap();
    assert_eq!(fetched, sealed);

    assert!(reporter.discard_report(&session_id));
    assert!(reporter.get_report(&session_id).is_none());
    assert!(!reporter.discard_report(&session_id));
}

#[test]
fn test_performance_metrics_rollup() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);

    reporter
        .update_performance_metrics(&session_id, 120.0, 35.0)
        .unwrap();
    reporter
        .update_performance_metrics(&session_id, 250.0, 55.0)
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    // A baseline sample is taken at session start, so at least three exist
    assert!(report.performance.samples.len() >= 3);
    assert!(report.performance.peak_memory_mb >= 250.0);
    assert!(report.performance.avg_cpu_pct >= 0.0);
}

#[test]
fn test_quality_and_validation_rollup() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Group);

    reporter
        .record_quality(&session_id, quality_fixture())
        .unwrap();
    reporter
        .record_validation(
            &session_id,
            &ValidationStats {
                total_records: 100,
                valid_records: 97,
                error_rate: 0.03,
            },
        )
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    assert_eq!(report.total_records, 100);
    assert_eq!(report.valid_records, 97);
    assert_eq!(report.quality.as_ref().unwrap().anomaly_count, 2);
    // Quality recommendations fold into the session recommendations
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("Timeliness")));
}

#[test]
fn test_failed_files_drive_recommendations() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);

    reporter
        .record_file_failed(&session_id, "bank1.csv", "unreadable")
        .unwrap();

    let report = reporter.finish_conversion(&session_id).unwrap();
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("files failed")));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("success rate below 90%")));
}

#[test]
fn test_elapsed_seconds_populated() {
    let reporter = SessionReporter::new();
    let session_id = reporter.start_conversion(UnitType::Bank);
    let report = reporter.finish_conversion(&session_id).unwrap();
    assert!(report.elapsed_seconds >= 0.0);
    assert_eq!(report.total_files_scanned, 0);
}
