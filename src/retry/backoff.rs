//! Backoff policies with growing delays and optional jitter.

use std::time::Duration;

use super::error::RetryError;
use super::policy::RetryPolicy;

/// A retry policy whose delay follows a backoff strategy.
///
/// The delay calculation is pure ([`delay_for_attempt`](Backoff::delay_for_attempt));
/// the [`RetryPolicy`] implementation adds the per-session attempt counter.
///
/// # Bounds
///
/// - `max_retries`: number of retries, not counting the initial attempt. With
///   `with_max_retries(3)` a failing operation runs 4 times and waits 3 times.
/// - `max_delay`: cap applied to every delay.
///
/// A policy with neither bound retries forever; [`validate`](Backoff::validate)
/// reports that case.
///
/// # Examples
///
/// ```rust
/// use tenacious::Backoff;
/// use std::time::Duration;
///
/// let policy = Backoff::exponential(Duration::from_millis(100))
///     .with_max_retries(5);
///
/// assert_eq!(policy.max_retries(), Some(5));
///
/// let policy = Backoff::constant(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(30));
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Backoff {
    strategy: BackoffStrategy,
    max_retries: Option<u32>,
    max_delay: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    jitter: JitterStrategy,
    #[cfg_attr(feature = "serde", serde(skip))]
    attempt: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    prev_delay: Option<Duration>,
}

/// How the delay grows between attempts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay increases linearly: base * (attempt + 1).
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows Fibonacci sequence: fib(attempt + 1) * base.
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay.
    Full,
    /// Random delay between the base and 3x the previous delay.
    Decorrelated,
}

impl Backoff {
    fn with_strategy(strategy: BackoffStrategy) -> Self {
        Self {
            strategy,
            max_retries: None,
            max_delay: None,
            jitter: JitterStrategy::None,
            attempt: 0,
            prev_delay: None,
        }
    }

    /// Constant delay between retries.
    ///
    /// ```rust
    /// use tenacious::Backoff;
    /// use std::time::Duration;
    ///
    /// let policy = Backoff::constant(Duration::from_millis(500)).with_max_retries(2);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(2), None);
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Constant(delay))
    }

    /// Linearly increasing delay: 100ms, 200ms, 300ms, ...
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Linear { base })
    }

    /// Doubling delay: 100ms, 200ms, 400ms, ...
    ///
    /// ```rust
    /// use tenacious::Backoff;
    /// use std::time::Duration;
    ///
    /// let policy = Backoff::exponential(Duration::from_millis(100)).with_max_retries(3);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(400)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Exponential { base })
    }

    /// Fibonacci delay: 100ms, 100ms, 200ms, 300ms, 500ms, ...
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Fibonacci { base })
    }

    /// Set the maximum number of retries, not counting the initial attempt.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Cap every delay at `d`.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add ±`factor` proportional jitter; `factor` is clamped to `0.0..=1.0`.
    /// A NaN or infinite factor disables jitter.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this has no effect
    /// on the delays.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Use full jitter: a random delay between zero and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Use decorrelated jitter.
    ///
    /// **Note**: Requires the `jitter` feature.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Decorrelated;
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Get the backoff strategy.
    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    /// Number of retries this instance has granted so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before retry `attempt` (0-indexed), without jitter.
    ///
    /// Returns `None` once `max_retries` is exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_retries {
            if attempt >= max {
                return None;
            }
        }

        let base_delay = match &self.strategy {
            BackoffStrategy::Constant(d) => *d,
            BackoffStrategy::Linear { base } => base.saturating_mul(attempt.saturating_add(1)),
            BackoffStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt))
            }
            BackoffStrategy::Fibonacci { base } => {
                base.saturating_mul(fibonacci(attempt.saturating_add(1)))
            }
        };

        Some(match self.max_delay {
            Some(max) => base_delay.min(max),
            None => base_delay,
        })
    }

    /// Check that the policy has at least one bound.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_retries.is_none() && self.max_delay.is_none() {
            Err("Backoff must have at least one bound (max_retries or max_delay)")
        } else {
            Ok(())
        }
    }
}

impl RetryPolicy for Backoff {
    fn next_delay(&mut self) -> Result<Duration, RetryError> {
        let base = self
            .delay_for_attempt(self.attempt)
            .ok_or(RetryError::MaxRetriesReached)?;
        let delay = self.jitter.apply(base, self.prev_delay, self.max_delay);
        self.attempt = self.attempt.saturating_add(1);
        self.prev_delay = Some(delay);
        Ok(delay)
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay, then re-apply the `max_delay` cap.
    ///
    /// `prev_delay` is only consulted by [`JitterStrategy::Decorrelated`].
    pub fn apply(
        &self,
        base_delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev_delay: Option<Duration>,
        max_delay: Option<Duration>,
    ) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                // NaN, infinite and non-positive factors leave the delay untouched.
                if !factor.is_finite() || *factor <= 0.0 {
                    base_delay
                } else {
                    let factor = factor.min(1.0);
                    let base_nanos = as_nanos(base_delay) as f64;
                    let min = base_nanos * (1.0 - factor);
                    let max = base_nanos * (1.0 + factor);
                    if max <= min {
                        base_delay
                    } else {
                        Duration::from_nanos(rand::rng().random_range(min..=max) as u64)
                    }
                }
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_nanos = as_nanos(base_delay);
                if max_nanos == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_nanos(rand::rng().random_range(0..=max_nanos))
                }
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Decorrelated => {
                use rand::Rng;
                let prev = prev_delay.unwrap_or(base_delay);
                let base_nanos = as_nanos(base_delay);
                let max_nanos = as_nanos(prev).saturating_mul(3);
                if max_nanos <= base_nanos {
                    base_delay
                } else {
                    Duration::from_nanos(rand::rng().random_range(base_nanos..=max_nanos))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) | JitterStrategy::Full | JitterStrategy::Decorrelated => {
                base_delay
            }
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}

#[cfg(feature = "jitter")]
fn as_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}
