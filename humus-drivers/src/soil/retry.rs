//! Bounded retry
//!
//! Attempt, back off, give up at a deadline or attempt limit. The
//! deadline is measured on the monotonic clock from the first attempt.

use humus_hal::Clock;

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Retry {
    /// Stop retrying once this much time has passed (ms)
    pub deadline_ms: u64,
    /// Sleep between attempts (ms)
    pub backoff_ms: u64,
    /// Optional cap on the number of attempts
    pub max_attempts: Option<u32>,
}

/// The operation never succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryExhausted<E> {
    /// Attempts made
    pub attempts: u32,
    /// Error from the final attempt
    pub last_error: E,
}

impl Retry {
    /// Retry until `deadline_ms` has elapsed, without back-off
    pub const fn until(deadline_ms: u64) -> Self {
        Self {
            deadline_ms,
            backoff_ms: 0,
            max_attempts: None,
        }
    }

    /// Sleep `backoff_ms` between attempts
    pub const fn with_backoff(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// Make at most `attempts` attempts
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Run `op` until it succeeds or the policy is exhausted
    ///
    /// `op` always runs at least once.
    pub fn run<C, T, E, F>(&self, clock: &C, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        C: Clock,
        F: FnMut() -> Result<T, E>,
    {
        let start = clock.now_ms();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let last_error = match op() {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let out_of_attempts = self.max_attempts.is_some_and(|max| attempts >= max);
            let out_of_time = clock.elapsed_since(start) > self.deadline_ms;
            if out_of_attempts || out_of_time {
                return Err(RetryExhausted {
                    attempts,
                    last_error,
                });
            }

            clock.sleep_ms(self.backoff_ms);
        }
    }
}
