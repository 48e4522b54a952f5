//! Configuration management for the normalization pipeline.
//!
//! Provides the error-handling strategy (policies, retry limits, abort
//! thresholds) and the validation range configuration. The strategy is an
//! explicit value threaded through constructors rather than process-global
//! state; partial updates merge over the current values.

use crate::constants::{
    self, DEFAULT_MAX_ERRORS_PER_FILE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
};
use serde::{Deserialize, Serialize};

/// Policy applied when a referenced input file does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileNotFoundPolicy {
    /// Drop the file silently and continue
    Skip,
    /// Record a warning and continue
    Warn,
    /// Record an error and abort the enclosing unit
    Error,
}

/// Policy applied when a row or file fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorPolicy {
    /// Drop the offending row, keep the rest of the file
    SkipRow,
    /// Drop the whole file, keep the rest of the session
    SkipFile,
    /// Abort the enclosing unit of work
    Abort,
}

/// Policy applied when canonical data fails a validation check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorPolicy {
    /// Keep the data but mark the validation result invalid
    MarkInvalid,
    /// Drop the offending data and continue
    SkipData,
    /// Abort the enclosing unit of work
    Abort,
}

/// Error-handling strategy governing retry, continue, and abort decisions.
///
/// One strategy value configures a whole conversion session. Failure sites
/// never decide recovery themselves; they classify the failure and defer the
/// continue/abort decision to the active strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorHandlingStrategy {
    /// Policy for missing input files
    pub on_file_not_found: FileNotFoundPolicy,

    /// Policy for row/file parse failures
    pub on_parse_error: ParseErrorPolicy,

    /// Policy for validation failures on canonical data
    pub on_validation_error: ValidationErrorPolicy,

    /// Recorded errors per file before the batch aborts
    pub max_errors_per_file: usize,

    /// Whether processing continues past a recorded error
    pub continue_on_error: bool,

    /// Retry attempts for transient failures
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ErrorHandlingStrategy {
    fn default() -> Self {
        Self {
            on_file_not_found: FileNotFoundPolicy::Warn,
            on_parse_error: ParseErrorPolicy::SkipRow,
            on_validation_error: ValidationErrorPolicy::MarkInvalid,
            max_errors_per_file: DEFAULT_MAX_ERRORS_PER_FILE,
            continue_on_error: true,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ErrorHandlingStrategy {
    /// Merge a partial override set onto this strategy.
    ///
    /// Fields left unset in the overrides keep their prior values, so
    /// `strategy.apply(StrategyOverrides { max_retries: Some(5), ..Default::default() })`
    /// changes only the retry limit.
    pub fn apply(&mut self, overrides: StrategyOverrides) {
        if let Some(policy) = overrides.on_file_not_found {
            self.on_file_not_found = policy;
        }
        if let Some(policy) = overrides.on_parse_error {
            self.on_parse_error = policy;
        }
        if let Some(policy) = overrides.on_validation_error {
            self.on_validation_error = policy;
        }
        if let Some(max) = overrides.max_errors_per_file {
            self.max_errors_per_file = max;
        }
        if let Some(cont) = overrides.continue_on_error {
            self.continue_on_error = cont;
        }
        if let Some(retries) = overrides.max_retries {
            self.max_retries = retries;
        }
        if let Some(delay) = overrides.retry_delay_ms {
            self.retry_delay_ms = delay;
        }
    }

    /// Create a strategy with a custom parse-error policy
    pub fn with_parse_error_policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.on_parse_error = policy;
        self
    }

    /// Create a strategy with a custom validation-error policy
    pub fn with_validation_error_policy(mut self, policy: ValidationErrorPolicy) -> Self {
        self.on_validation_error = policy;
        self
    }

    /// Create a strategy with a custom per-file error budget
    pub fn with_max_errors_per_file(mut self, max: usize) -> Self {
        self.max_errors_per_file = max;
        self
    }

    /// Create a strategy that aborts on the first recorded error
    pub fn with_fail_fast(mut self) -> Self {
        self.continue_on_error = false;
        self
    }

    /// Create a strategy with a custom retry limit
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Create a strategy with a custom backoff base delay
    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }
}

/// Partial strategy update; unset fields keep their current values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyOverrides {
    pub on_file_not_found: Option<FileNotFoundPolicy>,
    pub on_parse_error: Option<ParseErrorPolicy>,
    pub on_validation_error: Option<ValidationErrorPolicy>,
    pub max_errors_per_file: Option<usize>,
    pub continue_on_error: Option<bool>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

/// Inclusive numeric domain for one telemetry field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    /// Create a new range
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the range
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Check range membership
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance from the nearest bound for values outside the range, zero inside
    pub fn deviation(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

/// Validation domains for the telemetry fields checked by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRanges {
    /// Per-cell voltage domain in volts
    pub voltage: FieldRange,

    /// Temperature domain in degrees Celsius
    pub temperature: FieldRange,

    /// State-of-charge domain in percent
    pub soc: FieldRange,

    /// State-of-health domain in percent
    pub soh: FieldRange,
}

impl Default for ValidationRanges {
    fn default() -> Self {
        let (v_min, v_max) = constants::DEFAULT_VOLTAGE_RANGE;
        let (t_min, t_max) = constants::DEFAULT_TEMPERATURE_RANGE;
        let (soc_min, soc_max) = constants::DEFAULT_SOC_RANGE;
        let (soh_min, soh_max) = constants::DEFAULT_SOH_RANGE;
        Self {
            voltage: FieldRange::new(v_min, v_max),
            temperature: FieldRange::new(t_min, t_max),
            soc: FieldRange::new(soc_min, soc_max),
            soh: FieldRange::new(soh_min, soh_max),
        }
    }
}

impl ValidationRanges {
    /// Create ranges with a custom voltage domain
    pub fn with_voltage(mut self, min: f64, max: f64) -> Self {
        self.voltage = FieldRange::new(min, max);
        self
    }

    /// Create ranges with a custom temperature domain
    pub fn with_temperature(mut self, min: f64, max: f64) -> Self {
        self.temperature = FieldRange::new(min, max);
        self
    }
}
