//! Session reporter arena
//!
//! Live reports live in a key-indexed store guarded by a mutex; sealed
//! reports move to a second store where they stay retrievable until
//! explicitly discarded. Sessions never read each other's state, so the only
//! shared mutation is on the stores themselves.

use super::report::{
    ConversionReport, FileOutcome, FileStatus, PerformanceSample, RecordedIssue,
};
use crate::app::models::{
    ErrorContext, QualityReport, Severity, UnitType, ValidationStats,
};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use sysinfo::System;
use tracing::{debug, info};

/// Live session state: the report under construction plus sampling handles
struct ActiveSession {
    report: ConversionReport,
    started: Instant,
    sampler: System,
}

/// Session-keyed reporter for conversion runs.
///
/// `start_conversion` issues a fresh identifier and a zeroed report; the
/// record methods mutate that report in place; `finish_conversion` seals it.
pub struct SessionReporter {
    active: Mutex<HashMap<String, ActiveSession>>,
    sealed: Mutex<HashMap<String, ConversionReport>>,
    counter: AtomicU64,
}

impl SessionReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            sealed: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Start a conversion session and return its identifier.
    ///
    /// Performance sampling starts immediately with one baseline sample.
    pub fn start_conversion(&self, unit_type: UnitType) -> String {
        let session_id = format!(
            "conv-{}-{}-{}",
            unit_type,
            Utc::now().timestamp_millis(),
            self.counter.fetch_add(1, Ordering::SeqCst)
        );

        let mut session = ActiveSession {
            report: ConversionReport::new(&session_id, unit_type),
            started: Instant::now(),
            sampler: System::new(),
        };
        record_system_sample(&mut session);

        info!("Started conversion session {}", session_id);
        lock_recovering(&self.active).insert(session_id.clone(), session);
        session_id
    }

    /// Record a cleanly processed file
    pub fn record_file_processed(&self, session_id: &str, path: impl Into<String>) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.files_processed += 1;
            session.report.file_outcomes.push(FileOutcome {
                path: path.into(),
                status: FileStatus::Processed,
                detail: None,
            });
        })
    }

    /// Record a skipped file with its reason
    pub fn record_file_skipped(
        &self,
        session_id: &str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.files_skipped += 1;
            session.report.file_outcomes.push(FileOutcome {
                path: path.into(),
                status: FileStatus::Skipped,
                detail: Some(reason.into()),
            });
        })
    }

    /// Record a failed file.
    ///
    /// A failed file auto-synthesizes a corresponding error record so the
    /// error list always accounts for it.
    pub fn record_file_failed(
        &self,
        session_id: &str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<()> {
        let path = path.into();
        let reason = reason.into();
        self.with_session(session_id, |session| {
            session.report.files_failed += 1;
            session.report.file_outcomes.push(FileOutcome {
                path: path.clone(),
                status: FileStatus::Failed,
                detail: Some(reason.clone()),
            });
            session.report.errors.push(RecordedIssue {
                message: format!("File processing failed: {}", reason),
                severity: Severity::High,
                context: ErrorContext::new("process_file").with_file_path(path),
            });
        })
    }

    /// Record an error with its severity and locating context
    pub fn record_error(
        &self,
        session_id: &str,
        message: impl Into<String>,
        severity: Severity,
        context: ErrorContext,
    ) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.errors.push(RecordedIssue {
                message: message.into(),
                severity,
                context,
            });
        })
    }

    /// Record a warning with its severity and locating context
    pub fn record_warning(
        &self,
        session_id: &str,
        message: impl Into<String>,
        severity: Severity,
        context: ErrorContext,
    ) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.warnings.push(RecordedIssue {
                message: message.into(),
                severity,
                context,
            });
        })
    }

    /// Attach the quality report for the session's unit
    pub fn record_quality(&self, session_id: &str, quality: QualityReport) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.quality = Some(quality);
        })
    }

    /// Attach validation record counts
    pub fn record_validation(&self, session_id: &str, stats: &ValidationStats) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.total_records += stats.total_records;
            session.report.valid_records += stats.valid_records;
        })
    }

    /// Append one performance observation
    pub fn update_performance_metrics(
        &self,
        session_id: &str,
        memory_mb: f64,
        cpu_pct: f64,
    ) -> Result<()> {
        self.with_session(session_id, |session| {
            session.report.performance.samples.push(PerformanceSample {
                timestamp: Utc::now(),
                memory_mb,
                cpu_pct,
            });
        })
    }

    /// Sample live system memory and CPU into the session's performance record
    pub fn sample_system(&self, session_id: &str) -> Result<()> {
        self.with_session(session_id, record_system_sample)
    }

    /// Finish the session: compute rollups, seal the report, and discard the
    /// live sampling state. The sealed report stays retrievable by id.
    pub fn finish_conversion(&self, session_id: &str) -> Result<ConversionReport> {
        let mut session = lock_recovering(&self.active)
            .remove(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;

        let report = &mut session.report;
        report.finished_at = Some(Utc::now());
        report.elapsed_seconds = session.started.elapsed().as_secs_f64();
        report.total_files_scanned =
            report.files_processed + report.files_skipped + report.files_failed;
        report.performance.finalize();
        report.recommendations = build_session_recommendations(report);

        info!("{}", report.summary());

        let sealed = session.report;
        lock_recovering(&self.sealed).insert(session_id.to_string(), sealed.clone());
        Ok(sealed)
    }

    /// Retrieve a sealed report by session identifier
    pub fn get_report(&self, session_id: &str) -> Option<ConversionReport> {
        lock_recovering(&self.sealed).get(session_id).cloned()
    }

    /// Discard a sealed report, releasing its storage
    pub fn discard_report(&self, session_id: &str) -> bool {
        let removed = lock_recovering(&self.sealed).remove(session_id).is_some();
        if removed {
            debug!("Discarded sealed report {}", session_id);
        }
        removed
    }

    /// Number of currently live sessions
    pub fn active_session_count(&self) -> usize {
        lock_recovering(&self.active).len()
    }

    fn with_session<T>(
        &self,
        session_id: &str,
        apply: impl FnOnce(&mut ActiveSession) -> T,
    ) -> Result<T> {
        let mut sessions = lock_recovering(&self.active);
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;
        Ok(apply(session))
    }
}

impl Default for SessionReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a mutex, recovering the inner state from a poisoned guard
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Take one live system sample into the session's performance record
fn record_system_sample(session: &mut ActiveSession) {
    session.sampler.refresh_memory();
    session.sampler.refresh_cpu_usage();
    let memory_mb = session.sampler.used_memory() as f64 / 1024.0 / 1024.0;
    let cpu_pct = session.sampler.global_cpu_usage() as f64;
    session.report.performance.samples.push(PerformanceSample {
        timestamp: Utc::now(),
        memory_mb,
        cpu_pct,
    });
}

/// Fixed recommendation table for session-level outcomes
fn build_session_recommendations(report: &ConversionReport) -> Vec<String> {
    let mut recommendations = Vec::new();

    if report.files_failed > 0 {
        recommendations.push(format!(
            "{} files failed: review the error list and re-export the affected files",
            report.files_failed
        ));
    }
    if report.success_rate() < 90.0 {
        recommendations.push(
            "File success rate below 90%: check export integrity at the source site".to_string(),
        );
    }
    if report.validity_rate() < 90.0 {
        recommendations.push(
            "Record validity below 90%: inspect validation warnings for recurring fields"
                .to_string(),
        );
    }
    if let Some(quality) = &report.quality {
        recommendations.extend(quality.recommendations.iter().cloned());
    }

    recommendations
}
