//! BESS Normalizer Library
//!
//! A Rust library for converting battery-energy-storage telemetry exported as
//! heterogeneous CSV files into a standardized time-series representation with
//! data-quality assessment and anomaly reporting.
//!
//! This library provides tools for:
//! - Transforming wide-layout rows (one file per bank, all signal kinds) into
//!   canonical time series
//! - Aligning narrow-layout rows (one file per signal kind per group per day)
//!   across files onto a shared timeline
//! - Computing aggregate statistics over canonical series
//! - Structural validation, anomaly detection with severity grading, and
//!   quality scoring
//! - Error classification and retry middleware with configurable
//!   continue/abort policies
//! - Session-scoped conversion reporting with performance sampling
//!
//! File discovery and low-level CSV tokenizing are collaborator concerns: the
//! caller hands this library pre-tokenized [`RawBatch`](app::models::RawBatch)
//! values and consumes the returned standardized data and conversion report.

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod error_middleware;
        pub mod pipeline;
        pub mod session_reporter;
        pub mod statistics;
        pub mod transformer;
        pub mod validator;
    }
}

// Re-export commonly used types
pub use app::models::{Anomaly, BankTimeSeries, Severity, SignalKind, StandardBatteryData};
pub use app::services::pipeline::ConversionPipeline;
pub use config::ErrorHandlingStrategy;

/// Result type alias for the BESS normalizer
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for telemetry normalization operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// File could not be read or opened
    #[error("File access error for '{path}': {message}")]
    FileAccess { path: String, message: String },

    /// File exists but its layout does not match the expected export schema
    #[error("File format error in '{path}': {message}")]
    FileFormat { path: String, message: String },

    /// A cell value could not be parsed into the expected type
    #[error("Data parsing error: {message}")]
    DataParsing { message: String },

    /// Timestamp string could not be normalized
    #[error("Timestamp parsing error for value '{value}': {message}")]
    TimestampParsing { value: String, message: String },

    /// Canonical data failed a validation check
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Transformation produced a structurally invalid result
    #[error("Invalid result: {message}")]
    InvalidResult { message: String },

    /// Allocation or capacity failure while accumulating series data
    #[error("Memory error: {message}")]
    Memory { message: String },

    /// Session identifier not known to the reporter
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Batch aborted by the active error-handling strategy
    #[error("Batch aborted after {error_count} errors: {message}")]
    BatchAborted { error_count: usize, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unclassified system failure
    #[error("System error: {message}")]
    System { message: String },
}

impl Error {
    /// Create a file access error with context
    pub fn file_access(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileAccess {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file format error
    pub fn file_format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a data parsing error
    pub fn data_parsing(message: impl Into<String>) -> Self {
        Self::DataParsing {
            message: message.into(),
        }
    }

    /// Create a timestamp parsing error
    pub fn timestamp_parsing(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TimestampParsing {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create an invalid result error
    pub fn invalid_result(message: impl Into<String>) -> Self {
        Self::InvalidResult {
            message: message.into(),
        }
    }

    /// Create a memory error
    pub fn memory(message: impl Into<String>) -> Self {
        Self::Memory {
            message: message.into(),
        }
    }

    /// Create a session not found error
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            session_id: session_id.into(),
        }
    }

    /// Create a batch aborted error
    pub fn batch_aborted(error_count: usize, message: impl Into<String>) -> Self {
        Self::BatchAborted {
            error_count,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a system error
    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::FileAccess {
            path: "unknown".to_string(),
            message: error.to_string(),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::TimestampParsing {
            value: "unknown".to_string(),
            message: error.to_string(),
        }
    }
}
