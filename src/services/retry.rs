//! Bounded, non-blocking retry
//!
//! Polls a predicate once per interval until it yields a value or the attempt
//! budget runs out. Used to bridge "scroll near X was requested" and "X has
//! been mounted", which only becomes true after the next frame renders.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before each attempt (one frame)
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on how long a retry can take
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(20, Duration::from_millis(16))
    }
}

/// Call `predicate` up to `max_attempts` times, sleeping `interval` before
/// each call, and return the first `Some`
///
/// The predicate receives the zero-based attempt number. It must not hold
/// borrows across calls; nothing is held while sleeping.
pub async fn retry<T, F>(policy: RetryPolicy, mut predicate: F) -> Option<T>
where
    F: FnMut(u32) -> Option<T>,
{
    for attempt in 0..policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if let Some(value) = predicate(attempt) {
            tracing::trace!("retry succeeded on attempt {}", attempt + 1);
            return Some(value);
        }
    }
    None
}
