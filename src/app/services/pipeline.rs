//! Conversion pipeline orchestration
//!
//! The pipeline ties the services together for one conversion session:
//! transformation (middleware-wrapped, one file at a time), output rejection,
//! structural validation, anomaly scan, quality scoring, and session
//! reporting. Units are processed strictly sequentially; suspension happens
//! only at the collaborator's file-read boundary and the per-file operation
//! boundary, never concurrently within a session.

use crate::app::models::{
    AnomalyReport, BankTimeSeries, ErrorContext, FileDescriptor, QualityReport, RawBatch,
    StandardBatteryData, UnitType, ValidationResult,
};
use crate::app::services::error_middleware::{
    batch_process, categorize, handle_failure, run_with_retry, ErrorCategory, FailureSite,
    PolicyAction,
};
use crate::app::services::session_reporter::{ConversionReport, SessionReporter};
use crate::app::services::transformer::{
    align_narrow, build_standard_data, transform_wide, validate_output, DroppedRow,
};
use crate::app::services::validator::quality::build_summary;
use crate::app::services::validator::{detect_anomalies, generate_quality_report, validate_data};
use crate::config::{ErrorHandlingStrategy, StrategyOverrides, ValidationRanges};
use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Everything one conversion session produced
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Standardized data with its summary filled in
    pub data: StandardBatteryData,
    pub validation: ValidationResult,
    pub anomalies: AnomalyReport,
    pub quality: QualityReport,
    /// Sealed session report, also retrievable from the reporter by id
    pub report: ConversionReport,
}

/// Conversion pipeline for one or more sessions.
///
/// The error-handling strategy and validation ranges are explicit values held
/// by the pipeline; partial strategy updates merge over the current values.
pub struct ConversionPipeline {
    strategy: ErrorHandlingStrategy,
    ranges: ValidationRanges,
    reporter: Arc<SessionReporter>,
}

impl ConversionPipeline {
    /// Create a pipeline with default strategy and ranges
    pub fn new() -> Self {
        Self {
            strategy: ErrorHandlingStrategy::default(),
            ranges: ValidationRanges::default(),
            reporter: Arc::new(SessionReporter::new()),
        }
    }

    /// Create a pipeline sharing an existing reporter
    pub fn with_reporter(mut self, reporter: Arc<SessionReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Create a pipeline with a custom strategy
    pub fn with_strategy(mut self, strategy: ErrorHandlingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Create a pipeline with custom validation ranges
    pub fn with_ranges(mut self, ranges: ValidationRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Merge a partial strategy update over the current strategy
    pub fn set_strategy(&mut self, overrides: StrategyOverrides) {
        self.strategy.apply(overrides);
    }

    /// The active error-handling strategy
    pub fn strategy(&self) -> &ErrorHandlingStrategy {
        &self.strategy
    }

    /// The active validation ranges
    pub fn ranges(&self) -> &ValidationRanges {
        &self.ranges
    }

    /// The session reporter backing this pipeline
    pub fn reporter(&self) -> &Arc<SessionReporter> {
        &self.reporter
    }

    /// Convert pre-loaded wide-layout batches, one bank per batch.
    ///
    /// Runs a full session: transformation under the error budget, output
    /// rejection, validation, anomaly scan, quality scoring, and report
    /// sealing.
    pub async fn convert_wide(
        &self,
        unit_id: &str,
        batches: Vec<RawBatch>,
    ) -> Result<ConversionOutcome> {
        let session_id = self.reporter.start_conversion(UnitType::Bank);
        self.wide_in_session(session_id, unit_id, batches).await
    }

    /// Convert pre-loaded narrow-layout batches for one group.
    pub async fn convert_narrow(
        &self,
        unit_id: &str,
        batches: Vec<RawBatch>,
    ) -> Result<ConversionOutcome> {
        let session_id = self.reporter.start_conversion(UnitType::Group);
        self.narrow_in_session(session_id, unit_id, batches).await
    }

    /// Load wide-layout files through a collaborator loader, then convert.
    ///
    /// Each read is wrapped with retry and the file-not-found policy before
    /// the batches enter the normal wide conversion path.
    pub async fn run_wide<L, Fut>(
        &self,
        unit_id: &str,
        descriptors: Vec<FileDescriptor>,
        loader: L,
    ) -> Result<ConversionOutcome>
    where
        L: Fn(FileDescriptor) -> Fut,
        Fut: Future<Output = Result<RawBatch>>,
    {
        let session_id = self.reporter.start_conversion(UnitType::Bank);
        let batches = match self.load_descriptors(&session_id, descriptors, loader).await {
            Ok(batches) => batches,
            Err(error) => {
                let _ = self.reporter.finish_conversion(&session_id);
                return Err(error);
            }
        };
        self.wide_in_session(session_id, unit_id, batches).await
    }

    /// Load narrow-layout files through a collaborator loader, then convert.
    pub async fn run_narrow<L, Fut>(
        &self,
        unit_id: &str,
        descriptors: Vec<FileDescriptor>,
        loader: L,
    ) -> Result<ConversionOutcome>
    where
        L: Fn(FileDescriptor) -> Fut,
        Fut: Future<Output = Result<RawBatch>>,
    {
        let session_id = self.reporter.start_conversion(UnitType::Group);
        let batches = match self.load_descriptors(&session_id, descriptors, loader).await {
            Ok(batches) => batches,
            Err(error) => {
                let _ = self.reporter.finish_conversion(&session_id);
                return Err(error);
            }
        };
        self.narrow_in_session(session_id, unit_id, batches).await
    }

    /// Read each descriptor through the collaborator loader.
    ///
    /// Reads retry on transient failures; permanent failures dispatch through
    /// the strategy (file-access failures at the file-not-found site,
    /// everything else at the parse site).
    async fn load_descriptors<L, Fut>(
        &self,
        session_id: &str,
        descriptors: Vec<FileDescriptor>,
        loader: L,
    ) -> Result<Vec<RawBatch>>
    where
        L: Fn(FileDescriptor) -> Fut,
        Fut: Future<Output = Result<RawBatch>>,
    {
        let mut batches = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let path = descriptor.path.display().to_string();
            let context = ErrorContext::new("load_file").with_file_path(&path);
            let loaded = run_with_retry(&self.strategy, "load_file", &context, || {
                loader(descriptor.clone())
            })
            .await;

            match loaded {
                Ok(batch) => batches.push(batch),
                Err(error) => {
                    let site = if categorize(&error.to_string()) == ErrorCategory::FileAccess {
                        FailureSite::FileNotFound
                    } else {
                        FailureSite::ParseError
                    };
                    let decision = handle_failure(&self.strategy, site, &error, context);
                    match decision.action {
                        PolicyAction::Skip => {
                            self.reporter
                                .record_file_skipped(session_id, &path, &decision.message)?;
                        }
                        PolicyAction::Warn
                        | PolicyAction::SkipRow
                        | PolicyAction::MarkInvalid
                        | PolicyAction::SkipData => {
                            self.reporter.record_warning(
                                session_id,
                                &decision.message,
                                decision.severity,
                                decision.context.clone(),
                            )?;
                            self.reporter
                                .record_file_skipped(session_id, &path, &decision.message)?;
                        }
                        PolicyAction::SkipFile => {
                            self.reporter
                                .record_file_failed(session_id, &path, &decision.message)?;
                        }
                        PolicyAction::Error | PolicyAction::Abort => {
                            self.reporter.record_error(
                                session_id,
                                &decision.message,
                                decision.severity,
                                decision.context.clone(),
                            )?;
                            return Err(error);
                        }
                    }
                }
            }
        }

        Ok(batches)
    }

    /// Wide conversion inside an already-started session
    async fn wide_in_session(
        &self,
        session_id: String,
        unit_id: &str,
        batches: Vec<RawBatch>,
    ) -> Result<ConversionOutcome> {
        info!(
            "Converting {} wide-layout files for unit {} in session {}",
            batches.len(),
            unit_id,
            session_id
        );

        let reporter = self.reporter.clone();
        let strategy = self.strategy.clone();
        let session = session_id.clone();

        let outcome = batch_process(&self.strategy, batches, move |batch, _index| {
            let reporter = reporter.clone();
            let strategy = strategy.clone();
            let session = session.clone();
            async move {
                let path = batch
                    .source_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| batch.unit_id.clone());

                if batch.rows.is_empty() {
                    reporter.record_file_skipped(&session, &path, "file contained no rows")?;
                    return Ok(None);
                }

                let result = transform_wide(&batch);
                match dispatch_dropped_rows(
                    &strategy,
                    &reporter,
                    &session,
                    &path,
                    "transform_wide",
                    &result.dropped_rows,
                )? {
                    RowDispatch::Continue => {}
                    RowDispatch::SkipFile(reason) => {
                        reporter.record_file_failed(&session, &path, &reason)?;
                        return Ok(None);
                    }
                    RowDispatch::Abort(reason) => {
                        return Err(Error::batch_aborted(1, reason));
                    }
                }

                if result.series.points.is_empty() {
                    reporter.record_file_failed(
                        &session,
                        &path,
                        "no usable rows after transformation",
                    )?;
                    return Ok(None);
                }

                reporter.record_file_processed(&session, &path)?;
                Ok(Some(result.series))
            }
        })
        .await;

        if outcome.should_abort {
            let report = self.reporter.finish_conversion(&session_id)?;
            return Err(Error::batch_aborted(
                outcome.error_count,
                format!("wide conversion aborted; report sealed as {}", report.session_id),
            ));
        }

        let banks: Vec<BankTimeSeries> = outcome.results.into_iter().flatten().flatten().collect();
        self.finalize(session_id, unit_id, UnitType::Bank, banks)
    }

    /// Narrow conversion inside an already-started session
    async fn narrow_in_session(
        &self,
        session_id: String,
        unit_id: &str,
        batches: Vec<RawBatch>,
    ) -> Result<ConversionOutcome> {
        info!(
            "Aligning {} narrow-layout files for group {} in session {}",
            batches.len(),
            unit_id,
            session_id
        );

        let reporter = self.reporter.clone();
        let session = session_id.clone();

        // Per-file admission: untagged or empty files are skipped with their
        // outcome recorded; surviving batches feed one alignment pass.
        let outcome = batch_process(&self.strategy, batches, move |batch, _index| {
            let reporter = reporter.clone();
            let session = session.clone();
            async move {
                let path = batch
                    .source_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{}:{:?}", batch.unit_id, batch.kind));

                if batch.kind.is_none() {
                    reporter.record_file_skipped(&session, &path, "batch carries no signal kind")?;
                    return Ok(None);
                }
                if batch.rows.is_empty() {
                    reporter.record_file_skipped(&session, &path, "file contained no rows")?;
                    return Ok(None);
                }

                reporter.record_file_processed(&session, &path)?;
                Ok(Some(batch))
            }
        })
        .await;

        if outcome.should_abort {
            let report = self.reporter.finish_conversion(&session_id)?;
            return Err(Error::batch_aborted(
                outcome.error_count,
                format!("narrow conversion aborted; report sealed as {}", report.session_id),
            ));
        }

        let admitted: Vec<RawBatch> = outcome.results.into_iter().flatten().flatten().collect();
        let aligned = align_narrow(unit_id, &admitted);

        // Alignment merges files, so any escalating parse policy (skip-file
        // included) aborts the whole unit rather than one file.
        match dispatch_dropped_rows(
            &self.strategy,
            &self.reporter,
            &session_id,
            unit_id,
            "align_narrow",
            &aligned.dropped_rows,
        )? {
            RowDispatch::Continue => {}
            RowDispatch::SkipFile(_) | RowDispatch::Abort(_) => {
                let report = self.reporter.finish_conversion(&session_id)?;
                return Err(Error::batch_aborted(
                    aligned.dropped_rows.len(),
                    format!(
                        "narrow alignment aborted; report sealed as {}",
                        report.session_id
                    ),
                ));
            }
        }

        self.finalize(session_id, unit_id, UnitType::Group, vec![aligned.series])
    }

    /// Shared tail of every conversion: output rejection, validation, anomaly
    /// scan, quality scoring, summary fill, and session sealing.
    fn finalize(
        &self,
        session_id: String,
        unit_id: &str,
        unit_type: UnitType,
        banks: Vec<BankTimeSeries>,
    ) -> Result<ConversionOutcome> {
        let mut data = build_standard_data(unit_id, unit_type, banks);

        if let Err(error) = validate_output(&data) {
            let context = ErrorContext::new("validate_output");
            let decision =
                handle_failure(&self.strategy, FailureSite::ValidationError, &error, context);
            if decision.continue_processing {
                self.reporter.record_warning(
                    &session_id,
                    &decision.message,
                    decision.severity,
                    decision.context.clone(),
                )?;
            } else {
                self.reporter.record_error(
                    &session_id,
                    &decision.message,
                    decision.severity,
                    decision.context.clone(),
                )?;
                let _ = self.reporter.finish_conversion(&session_id)?;
                return Err(error);
            }
        }

        let validation = validate_data(&data, &self.ranges);
        self.reporter
            .record_validation(&session_id, &validation.statistics)?;

        let mut escalate_validation = false;
        for issue in &validation.errors {
            let error = Error::data_validation(issue.message.clone());
            let mut context = ErrorContext::new("validate_data");
            if let Some(bank_id) = &issue.bank_id {
                context = context.with_column_name(bank_id.clone());
            }
            if let Some(index) = issue.point_index {
                context = context.with_row_index(index);
            }
            let decision =
                handle_failure(&self.strategy, FailureSite::ValidationError, &error, context);
            self.reporter.record_error(
                &session_id,
                &decision.message,
                decision.severity,
                decision.context.clone(),
            )?;
            if !decision.continue_processing {
                escalate_validation = true;
            }
        }
        for issue in &validation.warnings {
            let mut context = ErrorContext::new("validate_data");
            if let Some(bank_id) = &issue.bank_id {
                context = context.with_column_name(bank_id.clone());
            }
            if let Some(index) = issue.point_index {
                context = context.with_row_index(index);
            }
            self.reporter.record_warning(
                &session_id,
                &issue.message,
                crate::app::models::Severity::Low,
                context,
            )?;
        }

        if escalate_validation {
            let _ = self.reporter.finish_conversion(&session_id)?;
            return Err(Error::data_validation(format!(
                "validation aborted unit {} with {} errors",
                unit_id,
                validation.errors.len()
            )));
        }

        let points: Vec<_> = data
            .banks
            .iter()
            .flat_map(|bank| bank.points.iter().cloned())
            .collect();
        let anomalies = detect_anomalies(unit_id, &points, &self.ranges);
        let quality = generate_quality_report(&data, &anomalies, &self.ranges);
        data.summary = build_summary(&validation, &quality);

        self.reporter.record_quality(&session_id, quality.clone())?;
        self.reporter.sample_system(&session_id)?;
        let report = self.reporter.finish_conversion(&session_id)?;

        Ok(ConversionOutcome {
            data,
            validation,
            anomalies,
            quality,
            report,
        })
    }
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// How a run of dropped rows resolved under the parse-error policy
enum RowDispatch {
    /// Every dropped row was recovered as a warning
    Continue,
    /// The policy chose to drop the enclosing file
    SkipFile(String),
    /// The policy chose to abort the enclosing unit
    Abort(String),
}

/// Dispatch dropped rows through the parse-error policy.
///
/// Recovered rows become recorded warnings; the first escalating decision
/// stops the dispatch and reports how the caller should unwind.
fn dispatch_dropped_rows(
    strategy: &ErrorHandlingStrategy,
    reporter: &SessionReporter,
    session_id: &str,
    path: &str,
    operation: &str,
    dropped_rows: &[DroppedRow],
) -> Result<RowDispatch> {
    for dropped in dropped_rows {
        let error = Error::data_parsing(dropped.reason.clone());
        let context = ErrorContext::new(operation)
            .with_file_path(dropped.source_path.clone().unwrap_or_else(|| path.to_string()))
            .with_row_index(dropped.row_index)
            .with_data_value(dropped.timestamp.clone());
        let decision = handle_failure(strategy, FailureSite::ParseError, &error, context);

        if decision.continue_processing {
            reporter.record_warning(
                session_id,
                &decision.message,
                decision.severity,
                decision.context.clone(),
            )?;
            continue;
        }

        reporter.record_error(
            session_id,
            &decision.message,
            decision.severity,
            decision.context.clone(),
        )?;
        return Ok(match decision.action {
            PolicyAction::SkipFile => RowDispatch::SkipFile(decision.message),
            _ => RowDispatch::Abort(decision.message),
        });
    }
    Ok(RowDispatch::Continue)
}
