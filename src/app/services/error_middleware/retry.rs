//! Exponential-backoff retry for transient failures
//!
//! Only transient failures (timeout/network-like message text) are retried,
//! and only while the attempt count stays under the strategy's limit. A
//! worker that always fails transiently is invoked exactly
//! `max_retries + 1` times before the final error propagates.

use super::classify::is_transient;
use crate::app::models::ErrorContext;
use crate::config::ErrorHandlingStrategy;
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Decide whether a failure should be retried.
///
/// True exactly when the failure is transient and the context's retry count
/// is still below the strategy's limit.
pub fn should_retry(error: &Error, context: &ErrorContext, strategy: &ErrorHandlingStrategy) -> bool {
    is_transient(&error.to_string()) && context.retry_count.unwrap_or(0) < strategy.max_retries
}

/// Run an async operation with exponential-backoff retry.
///
/// The backoff delay doubles per attempt from the strategy's base delay.
pub async fn run_with_retry<F, Fut, T>(
    strategy: &ErrorHandlingStrategy,
    operation_name: &str,
    context: &ErrorContext,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    warn!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(value);
            }
            Err(error) => {
                let attempt_context = context.clone().with_retry_count(attempt);
                if !should_retry(&error, &attempt_context, strategy) {
                    return Err(error);
                }

                let delay = strategy.retry_delay_ms.saturating_mul(1u64 << attempt.min(16));
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}. Retrying in {}ms",
                    operation_name,
                    attempt + 1,
                    strategy.max_retries + 1,
                    error,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
        }
    }
}
