//! Failure categorization and severity grading
//!
//! Categories are derived from the failure's message text by substring match,
//! so collaborator-raised failures classify the same way as crate-internal
//! ones. Unrecognized or empty messages fall back to the system category.

use crate::app::models::Severity;
use crate::constants::TRANSIENT_ERROR_MARKERS;
use serde::{Deserialize, Serialize};

/// Failure taxonomy for the error middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// File missing, unreadable, or permission-denied
    FileAccess,
    /// File readable but its layout is not the expected export schema
    FileFormat,
    /// Cell or timestamp value failed to parse
    DataParsing,
    /// Canonical data failed a validation check
    DataValidation,
    /// Allocation or capacity failure
    MemoryError,
    /// Fallback for unrecognized failures
    SystemError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::FileAccess => "file_access",
            ErrorCategory::FileFormat => "file_format",
            ErrorCategory::DataParsing => "data_parsing",
            ErrorCategory::DataValidation => "data_validation",
            ErrorCategory::MemoryError => "memory_error",
            ErrorCategory::SystemError => "system_error",
        };
        write!(f, "{}", name)
    }
}

const FILE_ACCESS_MARKERS: &[&str] = &[
    "file access",
    "no such file",
    "not found",
    "cannot open",
    "permission denied",
    "access denied",
];

const FILE_FORMAT_MARKERS: &[&str] = &["format", "header", "delimiter", "encoding", "utf-8"];

const DATA_PARSING_MARKERS: &[&str] = &[
    "parse",
    "parsing",
    "invalid number",
    "invalid digit",
    "timestamp",
    "unexpected token",
];

const DATA_VALIDATION_MARKERS: &[&str] = &[
    "validation",
    "invalid result",
    "out of range",
    "invalid data",
];

const MEMORY_MARKERS: &[&str] = &["memory", "allocation", "capacity overflow"];

/// Categorize a failure from its message text.
///
/// Marker lists are checked in a fixed order; the first category with a
/// matching fragment wins, and anything unmatched is a system error. Parsing
/// markers are checked before format markers because timestamp-parse messages
/// mention the formats they tried.
pub fn categorize(message: &str) -> ErrorCategory {
    let lowered = message.to_ascii_lowercase();

    let tables: [(&[&str], ErrorCategory); 5] = [
        (MEMORY_MARKERS, ErrorCategory::MemoryError),
        (FILE_ACCESS_MARKERS, ErrorCategory::FileAccess),
        (DATA_PARSING_MARKERS, ErrorCategory::DataParsing),
        (DATA_VALIDATION_MARKERS, ErrorCategory::DataValidation),
        (FILE_FORMAT_MARKERS, ErrorCategory::FileFormat),
    ];

    for (markers, category) in tables {
        if markers.iter().any(|marker| lowered.contains(marker)) {
            return category;
        }
    }

    ErrorCategory::SystemError
}

/// Fixed severity table per category.
///
/// Permission failures grade high within the file-access category; plain
/// missing files grade low because the strategy usually skips them.
pub fn severity(category: ErrorCategory, message: &str) -> Severity {
    let lowered = message.to_ascii_lowercase();
    match category {
        ErrorCategory::MemoryError => Severity::Critical,
        ErrorCategory::SystemError => Severity::High,
        ErrorCategory::FileAccess => {
            if lowered.contains("denied") {
                Severity::High
            } else {
                Severity::Low
            }
        }
        ErrorCategory::FileFormat => Severity::Medium,
        ErrorCategory::DataParsing => Severity::Medium,
        ErrorCategory::DataValidation => Severity::Low,
    }
}

/// Check whether a failure message marks a transient, retry-worthy condition
pub fn is_transient(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    TRANSIENT_ERROR_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
