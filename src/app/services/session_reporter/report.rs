//! Conversion report aggregate and rollups
//!
//! The report is the serializable session record: summary counts, per-file
//! outcomes, data-quality subscores, performance samples, recorded errors and
//! warnings, and recommendation strings. A one-paragraph human summary is
//! derivable from it.

use crate::app::models::{ErrorContext, QualityReport, Severity, UnitType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome classification for one scanned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Processed,
    Skipped,
    Failed,
}

/// Per-file outcome entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
    /// Failure or skip reason, when there is one
    pub detail: Option<String>,
}

/// One recorded error or warning with its locating context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedIssue {
    pub message: String,
    pub severity: Severity,
    pub context: ErrorContext,
}

/// One performance observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub timestamp: DateTime<Utc>,
    pub memory_mb: f64,
    pub cpu_pct: f64,
}

/// Performance rollup over a session's samples
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub samples: Vec<PerformanceSample>,
    pub peak_memory_mb: f64,
    pub avg_cpu_pct: f64,
}

impl PerformanceSummary {
    /// Recompute the rollup fields from the recorded samples
    pub fn finalize(&mut self) {
        self.peak_memory_mb = self
            .samples
            .iter()
            .map(|sample| sample.memory_mb)
            .fold(0.0, f64::max);
        self.avg_cpu_pct = if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().map(|sample| sample.cpu_pct).sum::<f64>()
                / self.samples.len() as f64
        };
    }
}

/// Session-scoped conversion record.
///
/// Created zeroed by `start_conversion`, mutated in place while the session
/// is live, and sealed by `finish_conversion`, after which it is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub session_id: String,
    pub unit_type: UnitType,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: f64,

    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    /// Sum of processed, skipped, and failed; computed at finish
    pub total_files_scanned: usize,
    pub file_outcomes: Vec<FileOutcome>,

    pub total_records: usize,
    pub valid_records: usize,

    pub errors: Vec<RecordedIssue>,
    pub warnings: Vec<RecordedIssue>,

    pub quality: Option<QualityReport>,
    pub performance: PerformanceSummary,
    pub recommendations: Vec<String>,
}

impl ConversionReport {
    /// Create a zeroed report for a fresh session
    pub fn new(session_id: impl Into<String>, unit_type: UnitType) -> Self {
        Self {
            session_id: session_id.into(),
            unit_type,
            started_at: Utc::now(),
            finished_at: None,
            elapsed_seconds: 0.0,
            files_processed: 0,
            files_skipped: 0,
            files_failed: 0,
            total_files_scanned: 0,
            file_outcomes: Vec::new(),
            total_records: 0,
            valid_records: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            quality: None,
            performance: PerformanceSummary::default(),
            recommendations: Vec::new(),
        }
    }

    /// Fraction of scanned files that processed cleanly, as a percentage
    pub fn success_rate(&self) -> f64 {
        let scanned = self.files_processed + self.files_skipped + self.files_failed;
        if scanned == 0 {
            100.0
        } else {
            (self.files_processed as f64 / scanned as f64) * 100.0
        }
    }

    /// Fraction of records that passed validation, as a percentage
    pub fn validity_rate(&self) -> f64 {
        if self.total_records == 0 {
            100.0
        } else {
            (self.valid_records as f64 / self.total_records as f64) * 100.0
        }
    }

    /// One-paragraph human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Conversion {}: {} of {} files processed ({:.1}% success), \
             {} of {} records valid ({:.1}% validity), \
             {} errors, {} warnings, completed in {:.2}s",
            self.session_id,
            self.files_processed,
            self.files_processed + self.files_skipped + self.files_failed,
            self.success_rate(),
            self.valid_records,
            self.total_records,
            self.validity_rate(),
            self.errors.len(),
            self.warnings.len(),
            self.elapsed_seconds
        )
    }
}
