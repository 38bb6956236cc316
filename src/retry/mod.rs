//! Retry policies, cancellable waits, and the retry loop.
//!
//! - **Policies** decide, after each failure, how long to wait or whether to
//!   stop. [`FixedDuration`] and [`Backoff`] are built in; any
//!   `FnMut() -> Result<Duration, RetryError>` closure also works.
//! - **Waits** sleep for a delay unless a [`CancellationToken`](crate::CancellationToken)
//!   fires first.
//! - **The loop** ([`retry_operation`]) ties them together.
//!
//! # Quick Start
//!
//! ```rust
//! use tenacious::{fixed_duration, retry_operation, CancellationToken, RetryError};
//! use std::time::Duration;
//!
//! let token = CancellationToken::new();
//!
//! match retry_operation(
//!     || Err::<(), _>("service unavailable"),
//!     fixed_duration(Duration::from_millis(1), 3),
//!     &token,
//! ) {
//!     Ok(()) => println!("done"),
//!     Err(RetryError::MaxRetriesReached) => println!("gave up"),
//!     Err(RetryError::Cancelled) => println!("cancelled"),
//!     Err(other) => println!("policy stopped: {}", other),
//! }
//! ```
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to randomize [`Backoff`] delays:
//!
//! ```toml
//! tenacious = { version = "...", features = ["jitter"] }
//! ```

mod backoff;
mod delay;
mod error;
mod operation;
mod policy;

pub use backoff::{Backoff, BackoffStrategy, JitterStrategy};
pub use delay::wait;
pub use error::{RetryError, RetryExhausted};
pub use operation::{
    retry_operation, retry_operation_detailed, retry_operation_with_hooks, RetryEvent,
};
pub use policy::{fixed_duration, FixedDuration, RetryPolicy};

#[cfg(feature = "async")]
pub use delay::wait_async;
#[cfg(feature = "async")]
pub use operation::{retry_operation_async, retry_operation_async_detailed};
