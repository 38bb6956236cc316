//! Async Cancellation Example
//!
//! Several tasks retry against a flaky backend; a shutdown signal cancels
//! all of them through one shared token.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tenacious::{retry_operation_async_detailed, Backoff, CancellationToken};

#[tokio::main]
async fn main() {
    println!("Async Cancellation Example");
    println!("==========================");

    let token = CancellationToken::new();
    let calls = Arc::new(AtomicU32::new(0));

    let workers: Vec<_> = (0..3)
        .map(|id| {
            let token = token.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                let result = retry_operation_async_detailed(
                    || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(format!("worker {} backend timeout", id))
                        }
                    },
                    Backoff::exponential(Duration::from_millis(20))
                        .with_max_delay(Duration::from_secs(1)),
                    &token,
                )
                .await;
                (id, result)
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(150)).await;
    println!("Shutting down");
    token.cancel();

    for worker in workers {
        match worker.await {
            Ok((id, Err(exhausted))) => println!(
                "  worker {}: {} (last error: {})",
                id, exhausted.reason, exhausted.last_error
            ),
            Ok((id, Ok(()))) => println!("  worker {}: succeeded", id),
            Err(e) => println!("  worker panicked: {}", e),
        }
    }

    println!("Total attempts: {}", calls.load(Ordering::SeqCst));
}
