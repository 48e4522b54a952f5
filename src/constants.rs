//! Application constants for the BESS normalizer
//!
//! This module contains signal-kind tags, default validation ranges, anomaly
//! severity thresholds, timestamp formats, and default values used throughout
//! the normalization pipeline.

// =============================================================================
// Signal Kind Tags
// =============================================================================

/// File-name tags for narrow-layout signal kinds
pub mod signal_tags {
    /// Per-cell voltage file tag (also carries bank voltage and current)
    pub const VOLTAGE: &str = "voltage";

    /// Per-cell temperature file tag
    pub const TEMPERATURE: &str = "temperature";

    /// Per-cell state-of-charge file tag
    pub const SOC: &str = "soc";

    /// Per-cell state-of-health file tag
    pub const STATE: &str = "state";

    /// All narrow-layout signal kind tags
    pub const ALL: &[&str] = &[VOLTAGE, TEMPERATURE, SOC, STATE];
}

/// Number of distinct signal kinds a complete narrow-layout group provides
pub const SIGNAL_KIND_COUNT: usize = 4;

// =============================================================================
// Timestamp Formats
// =============================================================================

/// Timestamp formats observed in site exports, tried in order.
///
/// The wide layout exports `M/D/YYYY H:MM`; the narrow layout exports ISO-ish
/// `YYYY-MM-DD HH:MM:SS`. Both appear with and without a seconds component.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Canonical timestamp rendering used for alignment keys and report output
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Validation Range Defaults
// =============================================================================

/// Default per-cell voltage domain in volts
pub const DEFAULT_VOLTAGE_RANGE: (f64, f64) = (2.5, 4.2);

/// Default temperature domain in degrees Celsius
pub const DEFAULT_TEMPERATURE_RANGE: (f64, f64) = (-40.0, 80.0);

/// Default state-of-charge domain in percent
pub const DEFAULT_SOC_RANGE: (f64, f64) = (0.0, 100.0);

/// Default state-of-health domain in percent
pub const DEFAULT_SOH_RANGE: (f64, f64) = (0.0, 100.0);

// =============================================================================
// Anomaly Detection Thresholds
// =============================================================================

/// Fixed-range extension factor for voltage outliers: values outside
/// `[min - 0.5*width, max + 0.5*width]` are flagged
pub const VOLTAGE_RANGE_EXTENSION: f64 = 0.5;

/// Statistical outlier threshold for temperature: deviations beyond
/// `2 * stdDev` from the sequence mean are flagged
pub const TEMPERATURE_SIGMA_MULTIPLIER: f64 = 2.0;

/// Severity ratio thresholds for range-relative voltage grading
pub mod voltage_severity {
    pub const CRITICAL: f64 = 3.0;
    pub const HIGH: f64 = 2.0;
    pub const MEDIUM: f64 = 1.0;
}

/// Severity ratio thresholds for threshold-relative temperature grading.
///
/// Temperature grades against the flagging threshold itself rather than the
/// range width, so its medium cutoff differs from voltage. The asymmetry is
/// load-bearing: downstream alert tuning depends on it.
pub mod temperature_severity {
    pub const CRITICAL: f64 = 3.0;
    pub const HIGH: f64 = 2.0;
    pub const MEDIUM: f64 = 1.5;
}

/// Missing bank-level fields per point before the anomaly escalates to high
pub const MISSING_FIELDS_HIGH_THRESHOLD: usize = 2;

/// Consecutive-point gap that counts as a time-gap anomaly
pub const TIME_GAP_ANOMALY_HOURS: i64 = 2;

/// Consecutive-point gap that escalates a time-gap anomaly to high severity
pub const TIME_GAP_HIGH_HOURS: i64 = 24;

// =============================================================================
// Quality Scoring Thresholds
// =============================================================================

/// Error-rate ceiling for a validation result to be considered valid
pub const MAX_VALID_ERROR_RATE: f64 = 0.10;

/// Gap width that degrades the timeliness subscore
pub const TIMELINESS_GAP_HOURS: i64 = 1;

/// Ordering / range-gap warning threshold in hours
pub const ORDERING_GAP_WARNING_HOURS: i64 = 2;

/// Completeness below which a data-collection check is recommended
pub const COMPLETENESS_RECOMMENDATION_THRESHOLD: f64 = 0.8;

/// Accuracy below which sensor calibration is recommended
pub const ACCURACY_RECOMMENDATION_THRESHOLD: f64 = 0.9;

/// Timeliness below which transmission-interval review is recommended
pub const TIMELINESS_RECOMMENDATION_THRESHOLD: f64 = 0.9;

/// Consistency below which export-pairing review is recommended
pub const CONSISTENCY_RECOMMENDATION_THRESHOLD: f64 = 0.8;

// =============================================================================
// Error Handling Defaults
// =============================================================================

/// Default maximum recorded errors per file before the batch aborts
pub const DEFAULT_MAX_ERRORS_PER_FILE: usize = 100;

/// Default retry attempts for transient failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential retry backoff
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Message fragments that mark a failure as transient and retryable
pub const TRANSIENT_ERROR_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "network",
    "connection",
    "temporarily unavailable",
];

// =============================================================================
// Helper Functions
// =============================================================================

/// Round a score to two decimal places for report output
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Check whether a reading is the missing-value sentinel.
///
/// Per-cell arrays carry NaN for absent readings; they are never silently
/// coerced to zero.
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Check whether a bank-level scalar counts as missing.
///
/// Bank-level fields default to literal `0` when the source export omitted
/// them, so zero is treated as missing at this level. Cell-level arrays are
/// exempt from this rule.
pub fn is_bank_field_missing(value: f64) -> bool {
    value.is_nan() || value == 0.0
}
