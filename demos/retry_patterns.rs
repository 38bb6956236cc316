//! Retry Patterns Example
//!
//! Demonstrates the blocking retry API:
//! - Fixed-delay retry that eventually succeeds
//! - Backoff strategies compared
//! - Observing failures with hooks
//! - Keeping the last error with the detailed variant
//! - Cancelling from another thread

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tenacious::{
    fixed_duration, retry_operation, retry_operation_detailed, retry_operation_with_hooks,
    Backoff, CancellationToken, RetryError,
};

// ==================== Basic Retry ====================

/// Example 1: fixed delay, operation recovers on the third attempt.
fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    let attempts = Arc::new(AtomicU32::new(0));
    let token = CancellationToken::new();

    let result = retry_operation(
        {
            let attempts = attempts.clone();
            move || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                println!("  Attempt {}", n + 1);
                if n < 2 {
                    Err("transient failure")
                } else {
                    Ok("success!")
                }
            }
        },
        fixed_duration(Duration::from_millis(100), 5),
        &token,
    );

    match result {
        Ok(value) => println!(
            "Success after {} attempts: {}",
            attempts.load(Ordering::SeqCst),
            value
        ),
        Err(e) => println!("Failed: {}", e),
    }
}

// ==================== Backoff Strategies ====================

/// Example 2: how delays grow with each strategy.
fn example_backoff_strategies() {
    println!("\n=== Example 2: Backoff Strategies ===");

    let base = Duration::from_millis(100);
    let strategies = [
        ("Constant", Backoff::constant(base)),
        ("Linear", Backoff::linear(base)),
        ("Exponential", Backoff::exponential(base)),
        ("Fibonacci", Backoff::fibonacci(base)),
    ];

    for (name, policy) in strategies {
        let policy = policy.with_max_retries(5);
        let delays: Vec<_> = (0..5).filter_map(|n| policy.delay_for_attempt(n)).collect();
        println!("  {:<12} {:?}", name, delays);
    }
}

// ==================== Hooks ====================

/// Example 3: log every failure before the loop waits.
fn example_hooks() {
    println!("\n=== Example 3: Retry Hooks ===");

    let token = CancellationToken::new();
    let result = retry_operation_with_hooks(
        || Err::<(), _>("connection reset"),
        Backoff::exponential(Duration::from_millis(10)).with_max_retries(3),
        &token,
        |event| {
            println!(
                "  attempt {} failed ({}), next delay {:?}, elapsed {:?}",
                event.attempt, event.error, event.next_delay, event.elapsed
            );
        },
    );

    if let Err(RetryError::MaxRetriesReached) = result {
        println!("Gave up: retries exhausted");
    }
}

// ==================== Detailed Outcome ====================

/// Example 4: keep the last error instead of only the sentinel.
fn example_detailed() {
    println!("\n=== Example 4: Detailed Outcome ===");

    let token = CancellationToken::new();
    let result = retry_operation_detailed(
        || Err::<(), _>("503 Service Unavailable"),
        fixed_duration(Duration::from_millis(5), 3),
        &token,
    );

    if let Err(exhausted) = result {
        println!("{}", exhausted);
    }
}

// ==================== Cancellation ====================

/// Example 5: a one-hour policy cut short by another thread.
fn example_cancellation() {
    println!("\n=== Example 5: Cancellation ===");

    let token = CancellationToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        println!("  cancelling");
        remote.cancel();
    });

    let start = Instant::now();
    let result = retry_operation(
        || Err::<(), _>("host unreachable"),
        fixed_duration(Duration::from_secs(3600), 5),
        &token,
    );

    match result {
        Err(RetryError::Cancelled) => println!("Cancelled after {:?}", start.elapsed()),
        other => println!("Unexpected: {:?}", other),
    }
    let _ = canceller.join();
}

fn main() {
    println!("Retry Patterns Examples");
    println!("=======================");

    example_basic_retry();
    example_backoff_strategies();
    example_hooks();
    example_detailed();
    example_cancellation();

    println!("\n=== All examples completed successfully! ===");
}
