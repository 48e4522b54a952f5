//! Batch driver tests

use crate::app::services::error_middleware::batch_process;
use crate::config::ErrorHandlingStrategy;
use crate::Error;

#[tokio::test]
async fn test_all_items_succeed() {
    let strategy = ErrorHandlingStrategy::default();
    let outcome = batch_process(&strategy, vec![1, 2, 3], |item, _| async move {
        Ok::<_, Error>(item * 10)
    })
    .await;

    assert_eq!(outcome.success_count, 3);
    assert_eq!(outcome.error_count, 0);
    assert!(!outcome.should_abort);
    assert_eq!(outcome.results, vec![Some(10), Some(20), Some(30)]);
}

#[tokio::test]
async fn test_failure_leaves_absent_marker() {
    let strategy = ErrorHandlingStrategy::default();
    let outcome = batch_process(&strategy, vec![0, 1, 2], |item, index| async move {
        if index == 1 {
            Err(Error::data_parsing("bad row"))
        } else {
            Ok(item)
        }
    })
    .await;

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.error_count, 1);
    assert!(!outcome.should_abort);
    assert_eq!(outcome.results, vec![Some(0), None, Some(2)]);
}

#[tokio::test]
async fn test_abort_at_error_budget() {
    // Five items under a budget of two: the run stops the moment the second
    // failure lands, leaving exactly three result slots behind.
    let strategy = ErrorHandlingStrategy::default().with_max_errors_per_file(2);
    let outcome = batch_process(&strategy, vec![0, 1, 2, 3, 4], |item, index| async move {
        if index == 1 || index == 2 {
            Err(Error::data_parsing("bad row"))
        } else {
            Ok::<_, Error>(item)
        }
    })
    .await;

    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.error_count, 2);
    assert!(outcome.should_abort);
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results, vec![Some(0), None, None]);
}

#[tokio::test]
async fn test_fail_fast_aborts_on_first_error() {
    let strategy = ErrorHandlingStrategy::default().with_fail_fast();
    let outcome = batch_process(&strategy, vec![0, 1, 2, 3], |item, index| async move {
        if index == 1 {
            Err(Error::data_parsing("bad row"))
        } else {
            Ok::<_, Error>(item)
        }
    })
    .await;

    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.error_count, 1);
    assert!(outcome.should_abort);
    assert_eq!(outcome.results.len(), 2);
}

#[tokio::test]
async fn test_critical_failure_is_non_continuable() {
    // A memory failure aborts regardless of the error budget
    let strategy = ErrorHandlingStrategy::default().with_max_errors_per_file(100);
    let outcome = batch_process(&strategy, vec![0, 1, 2, 3], |item, index| async move {
        if index == 1 {
            Err(Error::memory("memory allocation of 1024 bytes failed"))
        } else {
            Ok::<_, Error>(item)
        }
    })
    .await;

    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.error_count, 1);
    assert!(outcome.should_abort);
    assert_eq!(outcome.results.len(), 2);
}

#[tokio::test]
async fn test_errors_under_budget_do_not_abort() {
    let strategy = ErrorHandlingStrategy::default().with_max_errors_per_file(10);
    let outcome = batch_process(&strategy, vec![0, 1, 2, 3, 4], |item, index| async move {
        if index % 2 == 1 {
            Err(Error::data_parsing("bad row"))
        } else {
            Ok::<_, Error>(item)
        }
    })
    .await;

    assert_eq!(outcome.success_count, 3);
    assert_eq!(outcome.error_count, 2);
    assert!(!outcome.should_abort);
    assert_eq!(outcome.results.len(), 5);
}

#[tokio::test]
async fn test_empty_batch() {
    let strategy = ErrorHandlingStrategy::default();
    let outcome =
        batch_process(&strategy, Vec::<i32>::new(), |item, _| async move { Ok::<_, Error>(item) })
            .await;

    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.error_count, 0);
    assert!(!outcome.should_abort);
    assert!(outcome.results.is_empty());
}
