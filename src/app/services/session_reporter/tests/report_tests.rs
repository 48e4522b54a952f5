//! Conversion report rollup tests

use crate::app::models::UnitType;
use crate::app::services::session_reporter::report::{
    ConversionReport, PerformanceSample, PerformanceSummary,
};
use chrono::Utc;

#[test]
fn test_new_report_is_zeroed() {
    let report = ConversionReport::new("conv-test-1", UnitType::Bank);
    assert_eq!(report.files_processed, 0);
    assert_eq!(report.files_failed, 0);
    assert_eq!(report.total_files_scanned, 0);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert!(report.quality.is_none());
    assert!(report.finished_at.is_none());
}

#[test]
fn test_success_rate() {
    let mut report = ConversionReport::new("conv-test-1", UnitType::Bank);
    report.files_processed = 8;
    report.files_skipped = 1;
    report.files_failed = 1;
    assert_eq!(report.success_rate(), 80.0);

    // No files scanned counts as full success
    let empty = ConversionReport::new("conv-test-2", UnitType::Bank);
    assert_eq!(empty.success_rate(), 100.0);
}

#[test]
fn test_validity_rate() {
    let mut report = ConversionReport::new("conv-test-1", UnitType::Group);
    report.total_records = 200;
    report.valid_records = 150;
    assert_eq!(report.validity_rate(), 75.0);

    let empty = ConversionReport::new("conv-test-2", UnitType::Group);
    assert_eq!(empty.validity_rate(), 100.0);
}

#[test]
fn test_performance_summary_finalize() {
    let mut summary = PerformanceSummary {
        samples: vec![
            PerformanceSample {
                timestamp: Utc::now(),
                memory_mb: 100.0,
                cpu_pct: 20.0,
            },
            PerformanceSample {
                timestamp: Utc::now(),
                memory_mb: 300.0,
                cpu_pct: 60.0,
            },
            PerformanceSample {
                timestamp: Utc::now(),
                memory_mb: 200.0,
                cpu_pct: 40.0,
            },
        ],
        ..Default::default()
    };
    summary.finalize();

    assert_eq!(summary.peak_memory_mb, 300.0);
    assert_eq!(summary.avg_cpu_pct, 40.0);
}

#[test]
fn test_empty_performance_summary() {
    let mut summary = PerformanceSummary::default();
    summary.finalize();
    assert_eq!(summary.peak_memory_mb, 0.0);
    assert_eq!(summary.avg_cpu_pct, 0.0);
}

#[test]
fn test_summary_paragraph() {
    let mut report = ConversionReport::new("conv-bank-1", UnitType::Bank);
    report.files_processed = 2;
    report.files_failed = 1;
    report.total_records = 100;
    report.valid_records = 97;
    report.elapsed_seconds = 1.5;

    let summary = report.summary();
    assert!(summary.contains("conv-bank-1"));
    assert!(summary.contains("2 of 3 files"));
    assert!(summary.contains("97 of 100 records"));
    assert!(summary.contains("1.50s"));
}

#[test]
fn test_report_serializes_to_json() {
    let report = ConversionReport::new("conv-test-1", UnitType::Bank);
    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: ConversionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
}
