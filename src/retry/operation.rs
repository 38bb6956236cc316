//! The retry loop.
//!
//! Every function here runs the same sequence: invoke the operation, on
//! failure ask the policy for a delay, wait for that delay unless the token
//! fires, and try again. Attempts never overlap, and cancellation is only
//! observed while waiting; a running operation is never interrupted.
//!
//! Nothing in the loop bounds the number of attempts. An operation that never
//! succeeds combined with a policy that never stops loops forever.

use std::time::{Duration, Instant};

use super::delay::wait;
use super::error::{RetryError, RetryExhausted};
use super::policy::RetryPolicy;
use crate::cancel::CancellationToken;

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` if the policy stopped.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

/// Run `operation` until it succeeds, `policy` stops it, or `token` fires.
///
/// On success the operation's value is returned. On failure the result is the
/// policy's terminal condition (normally [`RetryError::MaxRetriesReached`]) or
/// [`RetryError::Cancelled`]; the operation's own error is discarded. Use
/// [`retry_operation_detailed`] to keep it.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, retry_operation, CancellationToken};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let mut calls = 0;
///
/// let result = retry_operation(
///     || {
///         calls += 1;
///         if calls < 3 { Err("not yet") } else { Ok(calls) }
///     },
///     fixed_duration(Duration::from_millis(1), 10),
///     &token,
/// );
///
/// assert_eq!(result.unwrap(), 3);
/// ```
pub fn retry_operation<T, E, F, P>(
    operation: F,
    policy: P,
    token: &CancellationToken,
) -> Result<T, RetryError>
where
    F: FnMut() -> Result<T, E>,
    P: RetryPolicy,
{
    run(operation, policy, token, |_: &RetryEvent<'_, E>| {}).map_err(RetryExhausted::into_reason)
}

/// Like [`retry_operation`], calling `on_retry` after every failed attempt.
///
/// The hook runs after the policy has decided and before the wait, so
/// [`RetryEvent::next_delay`] is `None` for the final failure.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, retry_operation_with_hooks, CancellationToken};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let mut seen = Vec::new();
///
/// let result = retry_operation_with_hooks(
///     || Err::<(), _>("timeout"),
///     fixed_duration(Duration::from_millis(1), 2),
///     &token,
///     |event| seen.push((event.attempt, event.next_delay)),
/// );
///
/// assert!(result.unwrap_err().is_max_retries_reached());
/// assert_eq!(seen, vec![(1, Some(Duration::from_millis(1))), (2, None)]);
/// ```
pub fn retry_operation_with_hooks<T, E, F, P, H>(
    operation: F,
    policy: P,
    token: &CancellationToken,
    on_retry: H,
) -> Result<T, RetryError>
where
    F: FnMut() -> Result<T, E>,
    P: RetryPolicy,
    H: FnMut(&RetryEvent<'_, E>),
{
    run(operation, policy, token, on_retry).map_err(RetryExhausted::into_reason)
}

/// Like [`retry_operation`], but a failure also reports the last operation
/// error, the number of attempts, and the elapsed time.
pub fn retry_operation_detailed<T, E, F, P>(
    operation: F,
    policy: P,
    token: &CancellationToken,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Result<T, E>,
    P: RetryPolicy,
{
    run(operation, policy, token, |_: &RetryEvent<'_, E>| {})
}

fn run<T, E, F, P, H>(
    mut operation: F,
    mut policy: P,
    token: &CancellationToken,
    mut on_retry: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Result<T, E>,
    P: RetryPolicy,
    H: FnMut(&RetryEvent<'_, E>),
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);
        let error = match operation() {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let decision = policy.next_delay();
        on_retry(&RetryEvent {
            attempt: attempts,
            error: &error,
            next_delay: decision.as_ref().ok().copied(),
            elapsed: start.elapsed(),
        });

        let outcome = decision.and_then(|delay| {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts, ?delay, "attempt failed, retrying");
            wait(delay, token)
        });

        if let Err(reason) = outcome {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts, %reason, "retry sequence stopped");
            return Err(RetryExhausted::new(reason, error, attempts, start.elapsed()));
        }
    }
}

/// Async version of [`retry_operation`].
///
/// `operation` produces a fresh future per attempt. The future is awaited to
/// completion; cancellation is only observed during the delay between
/// attempts.
///
/// # Examples
///
/// ```rust
/// use tenacious::{fixed_duration, retry_operation_async, CancellationToken};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let token = CancellationToken::new();
/// let result = retry_operation_async(
///     || async { Ok::<_, String>(42) },
///     fixed_duration(Duration::from_millis(1), 3),
///     &token,
/// )
/// .await;
///
/// assert_eq!(result.unwrap(), 42);
/// # });
/// ```
#[cfg(feature = "async")]
pub async fn retry_operation_async<T, E, F, Fut, P>(
    operation: F,
    policy: P,
    token: &CancellationToken,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: RetryPolicy,
{
    retry_operation_async_detailed(operation, policy, token)
        .await
        .map_err(RetryExhausted::into_reason)
}

/// Async version of [`retry_operation_detailed`].
#[cfg(feature = "async")]
pub async fn retry_operation_async_detailed<T, E, F, Fut, P>(
    mut operation: F,
    mut policy: P,
    token: &CancellationToken,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: RetryPolicy,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let outcome = match policy.next_delay() {
            Ok(delay) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = attempts, ?delay, "attempt failed, retrying");
                super::delay::wait_async(delay, token).await
            }
            Err(reason) => Err(reason),
        };

        if let Err(reason) = outcome {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts, %reason, "retry sequence stopped");
            return Err(RetryExhausted::new(reason, error, attempts, start.elapsed()));
        }
    }
}

#[cfg(all(test, feature = "tracing"))]
mod tracing_tests {
    use super::*;
    use crate::retry::policy::fixed_duration;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logs_retries_and_stop() {
        let token = CancellationToken::new();
        let result = retry_operation(
            || Err::<(), _>("boom"),
            fixed_duration(Duration::from_millis(1), 2),
            &token,
        );

        assert!(result.unwrap_err().is_max_retries_reached());
        assert!(logs_contain("attempt failed, retrying"));
        assert!(logs_contain("retry sequence stopped"));
        assert!(logs_contain("maximum number of retries reached"));
    }

    #[traced_test]
    #[test]
    fn test_logs_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result = retry_operation(
            || Err::<(), _>("boom"),
            fixed_duration(Duration::from_secs(3600), 5),
            &token,
        );

        assert!(result.unwrap_err().is_cancelled());
        assert!(logs_contain("operation was cancelled"));
    }
}
