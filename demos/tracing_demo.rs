//! Demonstrates the retry events emitted with the `tracing` feature
//!
//! Run with: cargo run --example tracing_demo --features tracing

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use tenacious::{fixed_duration, retry_operation, Backoff, CancellationToken};

fn main() {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    tracing::info!("Starting tracing demo");

    // Recovers on the third attempt: two "retrying" events, no stop event.
    let token = CancellationToken::new();
    let calls = Cell::new(0);
    let result = retry_operation(
        || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("connection refused")
            } else {
                Ok(calls.get())
            }
        },
        Backoff::exponential(Duration::from_millis(10)).with_max_retries(5),
        &token,
    );
    tracing::info!("Flaky call result: {:?}", result);

    // Exhausts the budget: the stop event carries the reason.
    let result = retry_operation(
        || Err::<(), _>("service unavailable"),
        fixed_duration(Duration::from_millis(5), 3),
        &token,
    );
    if let Err(e) = result {
        tracing::warn!("Gave up: {}", e);
    }

    // Cancelled from another thread while waiting.
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });
    let result = retry_operation(
        || Err::<(), _>("host unreachable"),
        fixed_duration(Duration::from_secs(3600), 5),
        &token,
    );
    if let Err(e) = result {
        tracing::warn!("Stopped: {}", e);
    }
    let _ = canceller.join();
}
