//! Error classification and retry middleware
//!
//! Wraps any fallible unit of work (file read, row transform, validation
//! step) with classification, severity grading, bounded retries, and
//! continue/abort decisions. Classification and severity are always computed
//! locally from the failure itself; whether a failure is recovered (recorded
//! as a warning, processing continues) or escalated (recorded as an error,
//! the enclosing unit aborts) is decided entirely by the active
//! [`ErrorHandlingStrategy`](crate::config::ErrorHandlingStrategy), never by
//! the failure site.
//!
//! # Architecture
//!
//! - [`classify`] - Message-text categorization and the fixed severity table
//! - [`retry`] - Exponential-backoff retry for transient failures
//! - [`batch`] - Sequential batch driver with per-file error budget
//! - [`policy`] - Per-site policy dispatch to continue/abort decisions

pub mod batch;
pub mod classify;
pub mod policy;
pub mod retry;

#[cfg(test)]
pub mod tests;

pub use batch::{batch_process, BatchOutcome};
pub use classify::{categorize, severity, ErrorCategory};
pub use policy::{handle_failure, FailureDecision, FailureSite, PolicyAction};
pub use retry::{run_with_retry, should_retry};
