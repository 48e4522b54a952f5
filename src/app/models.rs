//! Data models for BESS telemetry normalization
//!
//! This module contains the core data structures for representing raw
//! collaborator-supplied telemetry rows and the canonical standardized
//! time-series form the pipeline produces, together with the anomaly,
//! validation, and quality-report types built on top of it.

use crate::constants::{self, signal_tags};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Raw Input Model (collaborator-supplied)
// =============================================================================

/// Signal kind carried by a narrow-layout file.
///
/// The narrow site layout exports one file per signal kind per group per day;
/// the kind determines which canonical fields a row populates. Alignment
/// dispatches on this variant through a single exhaustive match, so adding a
/// kind touches exactly one decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Per-cell voltages plus bank-level voltage and current
    Voltage,
    /// Per-cell temperatures
    Temperature,
    /// Per-cell state of charge
    Soc,
    /// Per-cell state of health
    State,
}

impl SignalKind {
    /// All signal kinds in canonical merge order
    pub fn all() -> [SignalKind; 4] {
        [
            SignalKind::Voltage,
            SignalKind::Temperature,
            SignalKind::Soc,
            SignalKind::State,
        ]
    }

    /// File-name tag used by the narrow site export
    pub fn tag(self) -> &'static str {
        match self {
            SignalKind::Voltage => signal_tags::VOLTAGE,
            SignalKind::Temperature => signal_tags::TEMPERATURE,
            SignalKind::Soc => signal_tags::SOC,
            SignalKind::State => signal_tags::STATE,
        }
    }
}

impl FromStr for SignalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            signal_tags::VOLTAGE => Ok(SignalKind::Voltage),
            signal_tags::TEMPERATURE => Ok(SignalKind::Temperature),
            signal_tags::SOC => Ok(SignalKind::Soc),
            signal_tags::STATE => Ok(SignalKind::State),
            other => Err(Error::data_parsing(format!(
                "Unknown signal kind tag '{}': expected one of {:?}",
                other,
                signal_tags::ALL
            ))),
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Parallel ordered per-cell readings for one signal kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSeries {
    /// Which signal kind these readings belong to
    pub kind: SignalKind,
    /// Ordered cell readings; absent cells carry the NaN sentinel
    pub values: Vec<f64>,
}

impl CellSeries {
    /// Create a new tagged cell series
    pub fn new(kind: SignalKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }
}

/// One pre-tokenized CSV row as supplied by the scanning collaborator.
///
/// The wide layout populates every field on a single row; a narrow-layout row
/// carries only the fields of its batch's signal kind. Bank-level scalars the
/// export omitted arrive as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Source timestamp string, not yet normalized
    pub timestamp: String,

    /// Bank-level total voltage in volts
    pub bank_voltage: Option<f64>,

    /// Bank-level current in amperes (sign encodes charge/discharge)
    pub bank_current: Option<f64>,

    /// Bank-level state of charge in percent (wide layout only)
    pub bank_soc: Option<f64>,

    /// Bank-level state of health in percent (wide layout only)
    pub bank_soh: Option<f64>,

    /// Per-cell reading sequences present on this row, tagged by kind
    pub cells: Vec<CellSeries>,
}

impl RawRow {
    /// Create an empty row for the given timestamp string
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            bank_voltage: None,
            bank_current: None,
            bank_soc: None,
            bank_soh: None,
            cells: Vec::new(),
        }
    }

    /// Get the cell series for a signal kind, if present
    pub fn cell_series(&self, kind: SignalKind) -> Option<&[f64]> {
        self.cells
            .iter()
            .find(|series| series.kind == kind)
            .map(|series| series.values.as_slice())
    }
}

/// One batch of raw rows plus the metadata the file scanner extracted.
///
/// Wide layout: one batch per bank, `kind` and `date` unset. Narrow layout:
/// one batch per `(group, kind, day)` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    /// Logical unit identifier: bank id (wide) or group id (narrow)
    pub unit_id: String,

    /// Signal kind of a narrow-layout file
    pub kind: Option<SignalKind>,

    /// Export day of a narrow-layout file
    pub date: Option<NaiveDate>,

    /// Source path, carried for error context only
    pub source_path: Option<PathBuf>,

    /// Pre-tokenized rows
    pub rows: Vec<RawRow>,
}

impl RawBatch {
    /// Create a wide-layout batch for one bank
    pub fn wide(unit_id: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            unit_id: unit_id.into(),
            kind: None,
            date: None,
            source_path: None,
            rows,
        }
    }

    /// Create a narrow-layout batch for one (group, kind, day) file
    pub fn narrow(
        unit_id: impl Into<String>,
        kind: SignalKind,
        date: NaiveDate,
        rows: Vec<RawRow>,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            kind: Some(kind),
            date: Some(date),
            source_path: None,
            rows,
        }
    }

    /// Attach the source path for error context
    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }
}

/// One discovered input file as enumerated by the scanning collaborator.
///
/// Descriptors drive the loader-based conversion entry points; the pipeline
/// hands each one back to the collaborator's loader and wraps the read in the
/// error middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    /// Logical unit the file belongs to
    pub unit_id: String,
    /// Signal kind extracted from a narrow-layout file name
    pub kind: Option<SignalKind>,
    /// Export day extracted from a narrow-layout file name
    pub date: Option<NaiveDate>,
}

impl FileDescriptor {
    /// Create a wide-layout descriptor
    pub fn wide(path: impl Into<PathBuf>, unit_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            unit_id: unit_id.into(),
            kind: None,
            date: None,
        }
    }

    /// Create a narrow-layout descriptor
    pub fn narrow(
        path: impl Into<PathBuf>,
        unit_id: impl Into<String>,
        kind: SignalKind,
        date: NaiveDate,
    ) -> Self {
        Self {
            path: path.into(),
            unit_id: unit_id.into(),
            kind: Some(kind),
            date: Some(date),
        }
    }
}

// =============================================================================
// Canonical Time Series
// =============================================================================

/// Bank-level scalar readings of one canonical point.
///
/// Fields the source export omitted default to literal `0.0`; quality scoring
/// treats bank-level zeros as missing. `power` is always the derived product
/// `voltage * current`, never an independently trusted source value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankReadings {
    /// Total bank voltage in volts
    pub voltage: f64,
    /// Bank current in amperes
    pub current: f64,
    /// Bank state of charge in percent
    pub soc: f64,
    /// Bank state of health in percent
    pub soh: f64,
    /// Derived power in watts, `voltage * current`
    pub power: f64,
    /// Bank temperature in degrees Celsius (mean of cell temperatures)
    pub temperature: f64,
}

impl BankReadings {
    /// Zeroed readings, the canonical "nothing reported" state
    pub fn zeroed() -> Self {
        Self {
            voltage: 0.0,
            current: 0.0,
            soc: 0.0,
            soh: 0.0,
            power: 0.0,
            temperature: 0.0,
        }
    }

    /// Recompute the derived power field from voltage and current
    pub fn derive_power(&mut self) {
        self.power = self.voltage * self.current;
    }
}

/// Per-cell readings of one canonical point.
///
/// Arrays are empty when the kind was never reported for the timestamp;
/// individual absent cells carry the NaN sentinel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellData {
    pub voltages: Vec<f64>,
    pub temperatures: Vec<f64>,
    pub socs: Vec<f64>,
    pub sohs: Vec<f64>,
}

/// One canonical time-series point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Normalized UTC timestamp
    pub timestamp: DateTime<Utc>,
    /// Bank-level scalars
    pub bank: BankReadings,
    /// Per-cell readings
    pub cells: CellData,
}

impl TimeSeriesPoint {
    /// Create a zeroed point at the given timestamp
    pub fn zeroed(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            bank: BankReadings::zeroed(),
            cells: CellData::default(),
        }
    }
}

/// Aggregate of one field over a series: average, maximum, minimum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldAggregate {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// Per-bank aggregate statistics over all points with a non-sentinel value.
///
/// All-absent input yields all-zero aggregates; that is the documented default,
/// not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BankStatistics {
    pub voltage: FieldAggregate,
    pub current: FieldAggregate,
    pub soc: FieldAggregate,
    pub soh: FieldAggregate,
    pub temperature: FieldAggregate,
}

/// Canonical time series for one logical unit (bank or group)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTimeSeries {
    /// Bank or group identifier
    pub bank_id: String,
    /// Points sorted by timestamp, strictly increasing, deduplicated
    pub points: Vec<TimeSeriesPoint>,
    /// Aggregate statistics over the points
    pub statistics: BankStatistics,
}

impl BankTimeSeries {
    /// Check the strictly-increasing timestamp invariant
    pub fn is_strictly_ordered(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }
}

/// Kind of logical unit a standardized series describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Wide-layout bank
    Bank,
    /// Narrow-layout group
    Group,
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitType::Bank => write!(f, "bank"),
            UnitType::Group => write!(f, "group"),
        }
    }
}

/// First/last timestamp covered by a standardized series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Quality subscores and record counts attached to standardized output
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSummary {
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timeliness: f64,
    pub total_records: usize,
    pub valid_records: usize,
    pub error_records: usize,
}

/// Top-level standardized output: one logical unit with its canonical series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardBatteryData {
    /// Logical unit identifier
    pub unit_id: String,
    /// Whether this unit is a wide-layout bank or narrow-layout group
    pub unit_type: UnitType,
    /// Canonical series, one per bank
    pub banks: Vec<BankTimeSeries>,
    /// Covered time range
    pub time_range: Option<TimeRange>,
    /// Quality subscores and record counts
    pub summary: DataSummary,
}

impl StandardBatteryData {
    /// Total points across all banks
    pub fn point_count(&self) -> usize {
        self.banks.iter().map(|bank| bank.points.len()).sum()
    }
}

// =============================================================================
// Anomalies
// =============================================================================

/// Ordered severity classification shared by anomalies and classified errors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Kind of detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    VoltageOutlier,
    TemperatureOutlier,
    SocOutlier,
    MissingData,
    TimeGap,
}

/// One detected anomaly with its grading and locating context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub unit_id: String,
    pub value: f64,
    /// Expected domain, when the detection method has one
    pub expected_range: Option<(f64, f64)>,
    pub message: String,
}

/// Severity distribution and totals for one anomaly scan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_anomalies: usize,
    pub severity_distribution: HashMap<Severity, usize>,
}

/// Result of one anomaly scan over a point sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    pub summary: AnomalySummary,
}

impl AnomalyReport {
    /// Build a report from a list of anomalies, computing the summary
    pub fn from_anomalies(anomalies: Vec<Anomaly>) -> Self {
        let mut severity_distribution = HashMap::new();
        for anomaly in &anomalies {
            *severity_distribution.entry(anomaly.severity).or_insert(0) += 1;
        }
        let summary = AnomalySummary {
            total_anomalies: anomalies.len(),
            severity_distribution,
        };
        Self { anomalies, summary }
    }

    /// Count anomalies at or above a severity level
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.anomalies
            .iter()
            .filter(|anomaly| anomaly.severity >= severity)
            .count()
    }

    /// Check whether any critical anomaly was found
    pub fn has_critical(&self) -> bool {
        self.count_at_least(Severity::Critical) > 0
    }
}

// =============================================================================
// Validation
// =============================================================================

/// One structural validation finding with locating context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What failed, e.g. "missing unit identifier"
    pub message: String,
    /// Bank the finding belongs to, when point-level
    pub bank_id: Option<String>,
    /// Point index within the bank, when point-level
    pub point_index: Option<usize>,
}

impl ValidationIssue {
    /// Create a unit-level issue
    pub fn unit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            bank_id: None,
            point_index: None,
        }
    }

    /// Create a point-level issue
    pub fn point(message: impl Into<String>, bank_id: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            bank_id: Some(bank_id.into()),
            point_index: Some(index),
        }
    }
}

/// Record counts backing the validity predicate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_records: usize,
    pub valid_records: usize,
    pub error_rate: f64,
}

/// Result of structural validation over standardized data.
///
/// Invariant: `is_valid` holds exactly when `errors` is empty and
/// `error_rate` is below the 10% ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub statistics: ValidationStats,
}

impl ValidationResult {
    /// Build a result, deriving `is_valid` from the invariant
    pub fn new(
        errors: Vec<ValidationIssue>,
        warnings: Vec<ValidationIssue>,
        statistics: ValidationStats,
    ) -> Self {
        let is_valid =
            errors.is_empty() && statistics.error_rate < constants::MAX_VALID_ERROR_RATE;
        Self {
            is_valid,
            errors,
            warnings,
            statistics,
        }
    }
}

// =============================================================================
// Quality Report
// =============================================================================

/// Data-quality assessment over one standardized unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Arithmetic mean of the four subscores, rounded to two decimals
    pub overall_score: f64,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timeliness: f64,
    pub anomaly_count: usize,
    pub recommendations: Vec<String>,
}

// =============================================================================
// Error Context
// =============================================================================

/// Locating context attached to every classified failure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Operation that failed, e.g. "transform_wide"
    pub operation: String,
    pub file_path: Option<String>,
    pub row_index: Option<usize>,
    pub column_name: Option<String>,
    pub data_value: Option<String>,
    /// When the failure was recorded
    pub timestamp: Option<DateTime<Utc>>,
    /// Attempts already made, drives the retry bound
    pub retry_count: Option<u32>,
}

impl ErrorContext {
    /// Create a context for an operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Attach the file path
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Attach the row index
    pub fn with_row_index(mut self, index: usize) -> Self {
        self.row_index = Some(index);
        self
    }

    /// Attach the column name
    pub fn with_column_name(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    /// Attach the offending value
    pub fn with_data_value(mut self, value: impl Into<String>) -> Self {
        self.data_value = Some(value.into());
        self
    }

    /// Attach the retry count
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = Some(count);
        self
    }
}
