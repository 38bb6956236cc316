//! Async retry scenarios.

#![cfg(feature = "async")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tenacious::{
    fixed_duration, retry_operation_async, wait_async, Backoff, CancellationToken, RetryError,
};

#[tokio::test]
async fn test_async_always_failing_fixed_10ms_3() {
    let calls = Arc::new(AtomicU32::new(0));
    let token = CancellationToken::new();

    let start = Instant::now();
    let result = retry_operation_async(
        || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("down")
            }
        },
        fixed_duration(Duration::from_millis(10), 3),
        &token,
    )
    .await;

    assert!(matches!(result, Err(RetryError::MaxRetriesReached)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_async_cancel_from_os_thread() {
    let token = CancellationToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        remote.cancel();
    });

    let start = Instant::now();
    let result = retry_operation_async(
        || async { Err::<(), _>("down") },
        Backoff::exponential(Duration::from_secs(3600)).with_max_retries(5),
        &token,
    )
    .await;

    assert!(matches!(result, Err(RetryError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(5));
    canceller.join().unwrap();
}

#[tokio::test]
async fn test_many_tasks_share_one_token() {
    let token = CancellationToken::new();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let token = token.clone();
            tokio::spawn(async move { wait_async(Duration::from_secs(3600), &token).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    token.cancel();

    for task in tasks {
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
    }
}
