//! # Retry policy
//! Bounded retries with exponential backoff, applied to every service call.
//! Only errors that [may go away](crate::Error::is_retryable) are retried.

use std::time::Duration;

use crate::Result;

/// Doubling delay, capped. Each [`RetryPolicy::run`] starts a fresh one.
#[derive(Clone, Debug)]
pub struct Backoff {
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            max: max.max(initial),
            current: initial,
        }
    }

    /// Returns the delay to wait before the next attempt, and grows it.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves like one.
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Runs `operation` until it succeeds, fails for good, or runs out of attempts.
    pub fn run<T>(&self, what: &str, mut operation: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.attempts.max(1);
        let mut backoff = Backoff::new(self.initial_backoff, self.max_backoff);
        let mut attempt = 1;
        loop {
            match operation() {
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = backoff.next_delay();
                    log::warn!("{what} failed ({err}), attempt {attempt}/{attempts}, retrying in {delay:?}");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
