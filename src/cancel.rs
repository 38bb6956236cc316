//! Cooperative cancellation for retry sequences.
//!
//! A [`CancellationToken`] is a one-way, broadcast event. It starts armed and
//! becomes cancelled the first time [`CancellationToken::cancel`] is called.
//! Every wait that is pending at that moment, and every wait started later,
//! observes the cancellation. There is no way to re-arm a token; create a new
//! one per retry session.
//!
//! # Examples
//!
//! ```rust
//! use tenacious::CancellationToken;
//! use std::thread;
//! use std::time::Duration;
//!
//! let token = CancellationToken::new();
//! let remote = token.clone();
//!
//! let handle = thread::spawn(move || {
//!     thread::sleep(Duration::from_millis(5));
//!     remote.cancel();
//! });
//!
//! token.wait_cancelled();
//! assert!(token.is_cancelled());
//! handle.join().unwrap();
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A cloneable handle to a shared cancellation event.
///
/// Clones refer to the same event, so the token can be handed to another
/// thread (or task) that decides when to abort. Cancelling never blocks and
/// is a no-op once the token is already cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, bool> {
        // The flag is a plain bool, so a poisoned lock still holds a valid value.
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a new, armed cancellation token.
///
/// Equivalent to [`CancellationToken::new`].
pub fn create_cancellation_token() -> CancellationToken {
    CancellationToken::new()
}

impl CancellationToken {
    /// Create a new, armed token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation.
    ///
    /// Wakes every thread blocked in [`wait_cancelled`](Self::wait_cancelled)
    /// or [`wait_cancelled_timeout`](Self::wait_cancelled_timeout) and every
    /// task awaiting [`cancelled`](Self::cancelled). Safe to call from any
    /// thread, whether or not anyone is waiting.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.state();
        if *cancelled {
            return;
        }
        *cancelled = true;
        drop(cancelled);

        #[cfg(feature = "tracing")]
        tracing::trace!("cancellation token triggered");

        self.inner.condvar.notify_all();
        #[cfg(feature = "async")]
        self.inner.notify.notify_waiters();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.state()
    }

    /// Block the current thread until the token is cancelled.
    pub fn wait_cancelled(&self) {
        let guard = self.inner.state();
        let _guard = self
            .inner
            .condvar
            .wait_while(guard, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Block the current thread until the token is cancelled or `timeout`
    /// elapses.
    ///
    /// Returns `true` if the token was cancelled. A token that is already
    /// cancelled returns `true` immediately, even for a zero timeout.
    pub fn wait_cancelled_timeout(&self, timeout: Duration) -> bool {
        let guard = self.inner.state();
        let (guard, _timed_out) = self
            .inner
            .condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// Wait asynchronously until the token is cancelled.
    ///
    /// Resolves immediately if the token is already cancelled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tenacious::CancellationToken;
    ///
    /// # tokio_test::block_on(async {
    /// let token = CancellationToken::new();
    /// token.cancel();
    /// token.cancelled().await;
    /// # });
    /// ```
    #[cfg(feature = "async")]
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking the flag so a concurrent
            // cancel() between the check and the await cannot be missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
