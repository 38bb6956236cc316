//! The retry policy abstraction and the fixed-delay policy.

use std::time::Duration;

use super::error::RetryError;

/// Decides, after each failed attempt, whether to retry and how long to wait.
///
/// A policy is stateful: each call to [`next_delay`](RetryPolicy::next_delay)
/// accounts for one failed attempt. The retry functions take the policy by
/// value, so one policy instance serves exactly one retry session.
///
/// Any `FnMut() -> Result<Duration, RetryError>` closure is a policy, which
/// makes ad hoc strategies easy to plug in:
///
/// ```rust
/// use tenacious::{retry_operation, CancellationToken, RetryError};
/// use std::time::Duration;
///
/// // Doubling delay, three retries
/// let mut delay = Duration::from_millis(1);
/// let mut retries = 0;
/// let policy = move || {
///     retries += 1;
///     if retries > 3 {
///         return Err(RetryError::MaxRetriesReached);
///     }
///     let current = delay;
///     delay *= 2;
///     Ok(current)
/// };
///
/// let token = CancellationToken::new();
/// let result = retry_operation(|| Err::<(), _>("down"), policy, &token);
/// assert!(result.unwrap_err().is_max_retries_reached());
/// ```
pub trait RetryPolicy {
    /// Account for one failed attempt.
    ///
    /// Returns the delay before the next attempt, or the terminal condition
    /// that ends the sequence.
    fn next_delay(&mut self) -> Result<Duration, RetryError>;
}

impl<F> RetryPolicy for F
where
    F: FnMut() -> Result<Duration, RetryError>,
{
    fn next_delay(&mut self) -> Result<Duration, RetryError> {
        self()
    }
}

/// Wait the same amount of time between attempts, for a fixed number of
/// attempts.
///
/// The counter is incremented before it is compared, and the comparison is
/// `attempts >= max_retry`. A sequence therefore performs `max_retry - 1`
/// waits and `max_retry` attempts in total. With `max_retry` of 1 (or 0) the
/// first failure already stops the sequence.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, RetryPolicy};
/// use std::time::Duration;
///
/// let mut policy = fixed_duration(Duration::from_millis(100), 3);
///
/// assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(100));
/// assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(100));
/// assert!(policy.next_delay().unwrap_err().is_max_retries_reached());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedDuration {
    retry_period: Duration,
    max_retry: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    attempts: u32,
}

/// Create a [`FixedDuration`] policy.
pub fn fixed_duration(retry_period: Duration, max_retry: u32) -> FixedDuration {
    FixedDuration::new(retry_period, max_retry)
}

impl FixedDuration {
    /// Create a fresh policy with its counter at zero.
    pub fn new(retry_period: Duration, max_retry: u32) -> Self {
        Self {
            retry_period,
            max_retry,
            attempts: 0,
        }
    }

    /// The delay returned between attempts.
    pub fn retry_period(&self) -> Duration {
        self.retry_period
    }

    /// The configured attempt budget.
    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// Number of failed attempts accounted for so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Number of further calls that will still permit a retry.
    pub fn remaining(&self) -> u32 {
        self.max_retry.saturating_sub(self.attempts).saturating_sub(1)
    }
}

impl RetryPolicy for FixedDuration {
    fn next_delay(&mut self) -> Result<Duration, RetryError> {
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts >= self.max_retry {
            return Err(RetryError::MaxRetriesReached);
        }
        Ok(self.retry_period)
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_fixed_duration_three() {
        let mut policy = fixed_duration(Duration::from_millis(10), 3);

        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(10));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(10));
        assert!(policy.next_delay().unwrap_err().is_max_retries_reached());
        assert_eq!(policy.attempts(), 3);
    }

    #[test]
    fn test_fixed_duration_one_stops_immediately() {
        let mut policy = fixed_duration(Duration::from_secs(1), 1);
        assert!(policy.next_delay().unwrap_err().is_max_retries_reached());
    }

    #[test]
    fn test_fixed_duration_zero_stops_immediately() {
        let mut policy = fixed_duration(Duration::from_secs(1), 0);
        assert!(policy.next_delay().unwrap_err().is_max_retries_reached());
    }

    #[test]
    fn test_fixed_duration_stays_exhausted() {
        let mut policy = fixed_duration(Duration::from_millis(1), 2);
        assert!(policy.next_delay().is_ok());
        assert!(policy.next_delay().is_err());
        assert!(policy.next_delay().is_err());
    }

    #[test]
    fn test_fixed_duration_counter_saturates() {
        let mut policy = FixedDuration {
            retry_period: Duration::from_millis(1),
            max_retry: u32::MAX,
            attempts: u32::MAX - 1,
        };
        assert!(policy.next_delay().is_err());
        assert!(policy.next_delay().is_err());
        assert_eq!(policy.attempts(), u32::MAX);
    }

    #[test]
    fn test_fixed_duration_remaining() {
        let mut policy = fixed_duration(Duration::from_millis(1), 3);
        assert_eq!(policy.remaining(), 2);
        let _ = policy.next_delay();
        assert_eq!(policy.remaining(), 1);
        let _ = policy.next_delay();
        assert_eq!(policy.remaining(), 0);
        let _ = policy.next_delay();
        assert_eq!(policy.remaining(), 0);
    }

    #[test]
    fn test_fixed_duration_getters() {
        let policy = FixedDuration::new(Duration::from_millis(250), 4);
        assert_eq!(policy.retry_period(), Duration::from_millis(250));
        assert_eq!(policy.max_retry(), 4);
        assert_eq!(policy.attempts(), 0);
    }

    #[test]
    fn test_closure_is_policy() {
        let mut calls = 0;
        let mut policy = || {
            calls += 1;
            Ok::<_, RetryError>(Duration::from_millis(calls))
        };
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(1));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_fixed_duration_deserializes_fresh() {
        let mut policy = fixed_duration(Duration::from_millis(5), 3);
        let _ = policy.next_delay();

        let json = serde_json::to_string(&policy).unwrap();
        assert!(!json.contains("attempts"));

        let restored: FixedDuration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.attempts(), 0);
        assert_eq!(restored.max_retry(), 3);
        assert_eq!(restored.retry_period(), Duration::from_millis(5));
    }
}
