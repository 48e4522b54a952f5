//! Per-site policy dispatch
//!
//! Each failure site (missing file, parse failure, validation failure) maps
//! its configured policy onto one of two dispositions: recovered (recorded as
//! a warning, processing continues) or escalated (recorded as an error, the
//! enclosing unit aborts). The site itself never decides; the active strategy
//! does.

use super::classify::{categorize, severity, ErrorCategory};
use crate::app::models::{ErrorContext, Severity};
use crate::config::{
    ErrorHandlingStrategy, FileNotFoundPolicy, ParseErrorPolicy, ValidationErrorPolicy,
};
use crate::Error;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where in the pipeline a failure surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSite {
    FileNotFound,
    ParseError,
    ValidationError,
}

/// What the dispatched policy chose to do with the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyAction {
    Skip,
    Warn,
    Error,
    SkipRow,
    SkipFile,
    MarkInvalid,
    SkipData,
    Abort,
}

/// Outcome of dispatching one failure through the strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDecision {
    /// Action the configured policy selected
    pub action: PolicyAction,
    /// Category derived from the failure message
    pub category: ErrorCategory,
    /// Severity from the fixed table
    pub severity: Severity,
    /// Whether the enclosing unit keeps processing
    pub continue_processing: bool,
    /// Classified failure message
    pub message: String,
    /// Locating context carried with the record
    pub context: ErrorContext,
}

impl FailureDecision {
    /// True when the decision records a warning rather than an error
    pub fn is_recovered(&self) -> bool {
        self.continue_processing
    }
}

/// Dispatch one failure through the active strategy.
///
/// The returned decision carries everything the session reporter needs to
/// record the failure as either a warning (continue) or an error (abort).
pub fn handle_failure(
    strategy: &ErrorHandlingStrategy,
    site: FailureSite,
    error: &Error,
    context: ErrorContext,
) -> FailureDecision {
    let message = error.to_string();
    let category = categorize(&message);
    let graded = severity(category, &message);

    let (action, continue_processing) = match site {
        FailureSite::FileNotFound => match strategy.on_file_not_found {
            FileNotFoundPolicy::Skip => (PolicyAction::Skip, true),
            FileNotFoundPolicy::Warn => (PolicyAction::Warn, true),
            FileNotFoundPolicy::Error => (PolicyAction::Error, false),
        },
        FailureSite::ParseError => match strategy.on_parse_error {
            ParseErrorPolicy::SkipRow => (PolicyAction::SkipRow, true),
            ParseErrorPolicy::SkipFile => (PolicyAction::SkipFile, false),
            ParseErrorPolicy::Abort => (PolicyAction::Abort, false),
        },
        FailureSite::ValidationError => match strategy.on_validation_error {
            ValidationErrorPolicy::MarkInvalid => (PolicyAction::MarkInvalid, true),
            ValidationErrorPolicy::SkipData => (PolicyAction::SkipData, true),
            ValidationErrorPolicy::Abort => (PolicyAction::Abort, false),
        },
    };

    if continue_processing {
        debug!(
            "Recovered {} failure at {:?} via {:?}: {}",
            category, site, action, message
        );
    } else {
        warn!(
            "Escalated {} failure at {:?} via {:?}: {}",
            category, site, action, message
        );
    }

    FailureDecision {
        action,
        category,
        severity: graded,
        continue_processing,
        message,
        context,
    }
}
