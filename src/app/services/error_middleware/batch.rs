//! Sequential batch driver with per-file error budget
//!
//! Items are processed strictly one at a time; suspension happens only at the
//! worker's own await points, never concurrently with another item of the
//! same batch. Failed items leave an absent marker in the results so indexes
//! stay aligned with the input.

use super::classify::{categorize, severity};
use crate::app::models::Severity;
use crate::config::ErrorHandlingStrategy;
use crate::{Error, Result};
use std::future::Future;
use tracing::{debug, warn};

/// Accumulated outcome of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<R> {
    /// One slot per processed item; `None` marks a failure
    pub results: Vec<Option<R>>,
    pub success_count: usize,
    pub error_count: usize,
    /// True when the run stopped before exhausting its items
    pub should_abort: bool,
}

impl<R> BatchOutcome<R> {
    fn new() -> Self {
        Self {
            results: Vec::new(),
            success_count: 0,
            error_count: 0,
            should_abort: false,
        }
    }
}

/// Process items sequentially under the strategy's error budget.
///
/// The run aborts when the recorded error count reaches
/// `max_errors_per_file`, when a failure classifies as non-continuable
/// (critical severity), or immediately after the first error when
/// `continue_on_error` is off. Items after the abort point are never visited,
/// so `results.len()` records how far processing got.
pub async fn batch_process<T, R, F, Fut>(
    strategy: &ErrorHandlingStrategy,
    items: Vec<T>,
    mut worker: F,
) -> BatchOutcome<R>
where
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut outcome = BatchOutcome::new();

    for (index, item) in items.into_iter().enumerate() {
        match worker(item, index).await {
            Ok(result) => {
                outcome.results.push(Some(result));
                outcome.success_count += 1;
            }
            Err(error) => {
                outcome.error_count += 1;
                outcome.results.push(None);

                let message = error.to_string();
                let category = categorize(&message);
                let graded = severity(category, &message);
                warn!(
                    "Batch item {} failed ({}, {}): {}",
                    index, category, graded, message
                );

                // An abort marker from a policy dispatch is non-continuable
                // regardless of severity or budget.
                let non_continuable = graded >= Severity::Critical
                    || matches!(error, Error::BatchAborted { .. });

                if !strategy.continue_on_error {
                    outcome.should_abort = true;
                    break;
                }
                if non_continuable {
                    outcome.should_abort = true;
                    break;
                }
                if outcome.error_count >= strategy.max_errors_per_file {
                    outcome.should_abort = true;
                    break;
                }
            }
        }
    }

    debug!(
        "Batch complete: {} succeeded, {} failed, aborted: {}",
        outcome.success_count, outcome.error_count, outcome.should_abort
    );

    outcome
}
