//! # Tenacious
//!
//! Retry a fallible operation until it succeeds, a policy gives up, or the
//! caller cancels.
//!
//! ## Pieces
//!
//! - [`CancellationToken`]: a broadcast, one-way cancellation event that can
//!   be triggered from any thread.
//! - [`RetryPolicy`]: decides after each failure how long to wait, or stops
//!   the sequence. [`FixedDuration`] and [`Backoff`] are built in.
//! - [`retry_operation`]: the loop. It only ever sleeps between attempts, and
//!   that sleep is cut short by cancellation.
//!
//! ## Quick Example
//!
//! ```rust
//! use tenacious::{fixed_duration, retry_operation, CancellationToken, RetryError};
//! use std::thread;
//! use std::time::Duration;
//!
//! let token = CancellationToken::new();
//! let remote = token.clone();
//!
//! // Someone else decides to give up after 10ms.
//! let canceller = thread::spawn(move || {
//!     thread::sleep(Duration::from_millis(10));
//!     remote.cancel();
//! });
//!
//! let result = retry_operation(
//!     || Err::<(), _>("still down"),
//!     fixed_duration(Duration::from_secs(3600), 5),
//!     &token,
//! );
//!
//! assert!(matches!(result, Err(RetryError::Cancelled)));
//! canceller.join().unwrap();
//! ```
//!
//! ## Features
//!
//! - `async`: tokio-based [`wait_async`] and `retry_operation_async*`.
//! - `jitter`: randomized [`Backoff`] delays.
//! - `tracing`: debug events for retries and stops.
//! - `serde`: (de)serialize policy configuration.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cancel;
pub mod retry;
pub mod testing;

// Re-exports
pub use cancel::{create_cancellation_token, CancellationToken};
pub use retry::{
    fixed_duration, retry_operation, retry_operation_detailed, retry_operation_with_hooks, wait,
    Backoff, BackoffStrategy, FixedDuration, JitterStrategy, RetryError, RetryEvent,
    RetryExhausted, RetryPolicy,
};

#[cfg(feature = "async")]
pub use retry::{retry_operation_async, retry_operation_async_detailed, wait_async};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::retry::{
        fixed_duration, retry_operation, wait, Backoff, FixedDuration, RetryError, RetryPolicy,
    };
}
