//! Testing utilities for code that retries.
//!
//! - [`FlakyOperation`]: an operation that fails a fixed number of times and
//!   then succeeds, counting every call.
//! - [`RecordingPolicy`]: wraps a policy and records each decision.
//! - [`assert_cancelled!`](crate::assert_cancelled) and
//!   [`assert_max_retries!`](crate::assert_max_retries): assertions on retry
//!   outcomes.
//!
//! # Examples
//!
//! ```rust
//! use tenacious::testing::{FlakyOperation, RecordingPolicy};
//! use tenacious::{fixed_duration, retry_operation, CancellationToken};
//! use std::time::Duration;
//!
//! let flaky = FlakyOperation::new(2);
//! let policy = RecordingPolicy::new(fixed_duration(Duration::from_millis(1), 10));
//! let decisions = policy.decisions();
//!
//! let token = CancellationToken::new();
//! let result = retry_operation(flaky.operation(), policy, &token);
//!
//! assert!(result.is_ok());
//! assert_eq!(flaky.calls(), 3);
//! assert_eq!(decisions.lock().unwrap().len(), 2);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::retry::{RetryError, RetryPolicy};

/// An operation that fails `failures` times, then succeeds.
///
/// Cloning shares the call counter, so a clone can be kept for assertions
/// while the operation itself is moved into the retry loop.
#[derive(Debug, Clone)]
pub struct FlakyOperation {
    failures: u32,
    calls: Arc<AtomicU32>,
}

/// Error returned by [`FlakyOperation`] on a failing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakyError {
    /// The 1-indexed call that failed.
    pub call: u32,
}

impl std::fmt::Display for FlakyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flaky operation failed on call {}", self.call)
    }
}

impl std::error::Error for FlakyError {}

impl FlakyOperation {
    /// Fail the first `failures` calls.
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// An operation that never succeeds.
    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    /// Perform one call.
    pub fn call(&self) -> Result<u32, FlakyError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if call <= self.failures {
            Err(FlakyError { call })
        } else {
            Ok(call)
        }
    }

    /// A closure suitable for the retry functions.
    pub fn operation(&self) -> impl FnMut() -> Result<u32, FlakyError> + Send + 'static {
        let this = self.clone();
        move || this.call()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A policy wrapper that records every decision of the inner policy.
///
/// `Ok(delay)` is recorded as `Some(delay)` and a terminal condition as `None`.
#[derive(Debug)]
pub struct RecordingPolicy<P> {
    inner: P,
    decisions: Arc<Mutex<Vec<Option<Duration>>>>,
}

impl<P: RetryPolicy> RecordingPolicy<P> {
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            decisions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded decisions, valid after the policy has
    /// been moved into a retry loop.
    pub fn decisions(&self) -> Arc<Mutex<Vec<Option<Duration>>>> {
        Arc::clone(&self.decisions)
    }
}

impl<P: RetryPolicy> RetryPolicy for RecordingPolicy<P> {
    fn next_delay(&mut self) -> Result<Duration, RetryError> {
        let decision = self.inner.next_delay();
        self.decisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(decision.as_ref().ok().copied());
        decision
    }
}

/// Assert that a retry result is [`RetryError::Cancelled`].
///
/// # Example
///
/// ```rust
/// use tenacious::{assert_cancelled, RetryError};
///
/// let result: Result<(), RetryError> = Err(RetryError::Cancelled);
/// assert_cancelled!(result);
/// ```
#[macro_export]
macro_rules! assert_cancelled {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::Cancelled) => {}
            Err(other) => panic!("Expected Cancelled, got error: {}", other),
            Ok(_) => panic!("Expected Cancelled, got Ok"),
        }
    };
}

/// Assert that a retry result is [`RetryError::MaxRetriesReached`].
///
/// # Example
///
/// ```rust
/// use tenacious::{assert_max_retries, RetryError};
///
/// let result: Result<(), RetryError> = Err(RetryError::MaxRetriesReached);
/// assert_max_retries!(result);
/// ```
#[macro_export]
macro_rules! assert_max_retries {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::MaxRetriesReached) => {}
            Err(other) => panic!("Expected MaxRetriesReached, got error: {}", other),
            Ok(_) => panic!("Expected MaxRetriesReached, got Ok"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixed_duration, retry_operation, CancellationToken};

    #[test]
    fn test_flaky_operation_counts_calls() {
        let flaky = FlakyOperation::new(1);
        assert_eq!(flaky.call(), Err(FlakyError { call: 1 }));
        assert_eq!(flaky.call(), Ok(2));
        assert_eq!(flaky.calls(), 2);
    }

    #[test]
    fn test_flaky_operation_clones_share_counter() {
        let flaky = FlakyOperation::always_failing();
        let mut op = flaky.operation();
        let _ = op();
        let _ = op();
        assert_eq!(flaky.calls(), 2);
    }

    #[test]
    fn test_recording_policy_records_terminal() {
        let mut policy = RecordingPolicy::new(fixed_duration(Duration::from_millis(3), 2));
        let decisions = policy.decisions();
        let _ = policy.next_delay();
        let _ = policy.next_delay();
        assert_eq!(
            *decisions.lock().unwrap(),
            vec![Some(Duration::from_millis(3)), None]
        );
    }

    #[test]
    fn test_assert_macros() {
        let token = CancellationToken::new();
        assert_max_retries!(retry_operation(
            FlakyOperation::always_failing().operation(),
            fixed_duration(Duration::from_millis(1), 2),
            &token,
        ));

        token.cancel();
        assert_cancelled!(retry_operation(
            FlakyOperation::always_failing().operation(),
            fixed_duration(Duration::from_secs(3600), 2),
            &token,
        ));
    }

    #[test]
    #[should_panic(expected = "Expected Cancelled")]
    fn test_assert_cancelled_panics_on_ok() {
        let result: Result<(), RetryError> = Ok(());
        assert_cancelled!(result);
    }
}
