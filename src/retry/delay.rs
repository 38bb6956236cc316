//! Cancellable delays.

use std::time::Duration;

use super::error::RetryError;
use crate::cancel::CancellationToken;

/// Block the current thread for `duration`, or until `token` is cancelled.
///
/// Returns `Ok(())` when the delay elapsed and [`RetryError::Cancelled`] when
/// the token fired first. A token that is already cancelled returns
/// immediately. If the delay ends at the same moment the token fires, either
/// outcome may be reported.
///
/// # Examples
///
/// ```rust
/// use tenacious::{wait, CancellationToken};
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// assert!(wait(Duration::from_millis(1), &token).is_ok());
///
/// token.cancel();
/// assert!(wait(Duration::from_secs(3600), &token).unwrap_err().is_cancelled());
/// ```
pub fn wait(duration: Duration, token: &CancellationToken) -> Result<(), RetryError> {
    if token.wait_cancelled_timeout(duration) {
        Err(RetryError::Cancelled)
    } else {
        Ok(())
    }
}

/// Wait asynchronously for `duration`, or until `token` is cancelled.
///
/// The timer and the token are raced without priority: when both are ready
/// at the same poll, either branch may win.
///
/// # Examples
///
/// ```rust
/// use tenacious::{wait_async, CancellationToken};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let token = CancellationToken::new();
/// token.cancel();
/// let result = wait_async(Duration::from_secs(3600), &token).await;
/// assert!(result.unwrap_err().is_cancelled());
/// # });
/// ```
#[cfg(feature = "async")]
pub async fn wait_async(duration: Duration, token: &CancellationToken) -> Result<(), RetryError> {
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = token.cancelled() => Err(RetryError::Cancelled),
    }
}

#[cfg(test)]
mod delay_tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_elapses_without_cancel() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(wait(Duration::from_millis(20), &token).is_ok());
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_zero_duration() {
        let token = CancellationToken::new();
        assert!(wait(Duration::ZERO, &token).is_ok());
    }

    #[test]
    fn test_wait_interrupted_by_cancel() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            remote.cancel();
        });

        let start = Instant::now();
        let result = wait(Duration::from_secs(3600), &token);
        assert!(result.unwrap_err().is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_simultaneous_accepts_either_outcome() {
        let token = CancellationToken::new();
        token.cancel();
        // Both the zero-length timer and the token are ready.
        match wait(Duration::ZERO, &token) {
            Ok(()) | Err(RetryError::Cancelled) => {}
            Err(other) => panic!("unexpected outcome: {}", other),
        }
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_async_elapses() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(wait_async(Duration::from_millis(10), &token).await.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_async_interrupted() {
        let token = CancellationToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            remote.cancel();
        });
        let result = wait_async(Duration::from_secs(3600), &token).await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_wait_async_simultaneous_accepts_either_outcome() {
        let token = CancellationToken::new();
        token.cancel();
        match wait_async(Duration::ZERO, &token).await {
            Ok(()) | Err(RetryError::Cancelled) => {}
            Err(other) => panic!("unexpected outcome: {}", other),
        }
    }
}
