//! Error types for retry operations.

use std::fmt;
use std::time::Duration;

/// The terminal condition that ends an unsuccessful retry sequence.
///
/// Callers branch on the two sentinel conditions,
/// [`MaxRetriesReached`](RetryError::MaxRetriesReached) and
/// [`Cancelled`](RetryError::Cancelled). Custom policies may stop for their own
/// reasons through [`Policy`](RetryError::Policy); those are propagated
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, retry_operation, CancellationToken, RetryError};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let result = retry_operation(
///     || Err::<(), _>("unavailable"),
///     fixed_duration(Duration::from_millis(1), 2),
///     &token,
/// );
///
/// match result {
///     Err(RetryError::MaxRetriesReached) => {}
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
#[derive(Debug)]
pub enum RetryError {
    /// The policy's attempt budget is spent.
    MaxRetriesReached,
    /// The cancellation token fired while waiting between attempts.
    Cancelled,
    /// A custom policy stopped for a reason of its own.
    Policy(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl RetryError {
    /// Wrap a custom policy condition.
    pub fn policy<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Policy(error.into())
    }

    /// Returns true if the policy ran out of attempts.
    pub fn is_max_retries_reached(&self) -> bool {
        matches!(self, Self::MaxRetriesReached)
    }

    /// Returns true if the sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true if a custom policy condition ended the sequence.
    pub fn is_policy(&self) -> bool {
        matches!(self, Self::Policy(_))
    }
}

impl fmt::Display for RetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRetriesReached => write!(f, "maximum number of retries reached"),
            Self::Cancelled => write!(f, "operation was cancelled"),
            Self::Policy(e) => write!(f, "retry policy stopped: {}", e),
        }
    }
}

impl std::error::Error for RetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Policy(e) => Some(e.as_ref()),
            Self::MaxRetriesReached | Self::Cancelled => None,
        }
    }
}

/// Error returned by the detailed retry functions.
///
/// Carries the terminal condition together with the error from the last
/// attempt, which [`retry_operation`](crate::retry_operation) discards.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, retry_operation_detailed, CancellationToken};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let exhausted = retry_operation_detailed(
///     || Err::<(), _>("connection refused"),
///     fixed_duration(Duration::from_millis(1), 3),
///     &token,
/// )
/// .unwrap_err();
///
/// assert!(exhausted.reason.is_max_retries_reached());
/// assert_eq!(exhausted.last_error, "connection refused");
/// assert_eq!(exhausted.attempts, 3);
/// ```
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Why the sequence stopped.
    pub reason: RetryError,
    /// The error from the final attempt.
    pub last_error: E,
    /// Total number of attempts made.
    pub attempts: u32,
    /// Time from the first attempt until the sequence stopped.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(reason: RetryError, last_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            reason,
            last_error,
            attempts,
            total_duration,
        }
    }

    /// Discard the diagnostics and keep only the terminal condition.
    pub fn into_reason(self) -> RetryError {
        self.reason
    }

    /// Extract the last operation error.
    pub fn into_error(self) -> E {
        self.last_error
    }

    /// Get a reference to the last operation error.
    pub fn error(&self) -> &E {
        &self.last_error
    }

    /// Returns true if the sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.reason.is_cancelled()
    }

    /// Returns true if the policy ran out of attempts.
    pub fn is_max_retries_reached(&self) -> bool {
        self.reason.is_max_retries_reached()
    }
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} attempts ({:?}): {}",
            self.reason, self.attempts, self.total_duration, self.last_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sentinel_predicates() {
        assert!(RetryError::MaxRetriesReached.is_max_retries_reached());
        assert!(!RetryError::MaxRetriesReached.is_cancelled());
        assert!(RetryError::Cancelled.is_cancelled());
        assert!(!RetryError::Cancelled.is_policy());
        assert!(RetryError::policy("deadline exceeded").is_policy());
    }

    #[test]
    fn test_retry_error_display() {
        assert_eq!(
            RetryError::MaxRetriesReached.to_string(),
            "maximum number of retries reached"
        );
        assert_eq!(RetryError::Cancelled.to_string(), "operation was cancelled");
        assert!(RetryError::policy("deadline exceeded")
            .to_string()
            .contains("deadline exceeded"));
    }

    #[test]
    fn test_policy_error_source() {
        let err = RetryError::policy("deadline exceeded");
        assert_eq!(err.source().unwrap().to_string(), "deadline exceeded");
        assert!(RetryError::Cancelled.source().is_none());
    }

    #[test]
    fn test_retry_exhausted_display() {
        let err = RetryExhausted::new(
            RetryError::MaxRetriesReached,
            "connection failed",
            3,
            Duration::from_millis(500),
        );
        let display = format!("{}", err);
        assert!(display.contains("maximum number of retries reached"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("connection failed"));
    }

    #[test]
    fn test_retry_exhausted_accessors() {
        let err = RetryExhausted::new(RetryError::Cancelled, "io", 2, Duration::ZERO);
        assert!(err.is_cancelled());
        assert!(!err.is_max_retries_reached());
        assert_eq!(*err.error(), "io");
        assert!(err.into_reason().is_cancelled());
    }

    #[test]
    fn test_retry_exhausted_into_error() {
        let err = RetryExhausted::new(RetryError::MaxRetriesReached, "test error", 5, Duration::ZERO);
        assert_eq!(err.into_error(), "test error");
    }
}
