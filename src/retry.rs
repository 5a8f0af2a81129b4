//! Bounded retry with a fixed backoff.
//!
//! Every failed attempt except the last is followed by a sleep of
//! `2 × base_delay`. The multiplier does not grow between attempts.

use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

pub const BACKOFF_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn backoff(&self) -> Duration {
        self.base_delay * BACKOFF_MULTIPLIER
    }

    /// Runs `op` until it succeeds or attempts run out, returning the last error.
    pub fn run<T, E, F>(&self, what: &str, op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        self.run_with_sleep(what, op, std::thread::sleep)
    }

    pub fn run_with_sleep<T, E, F, S>(&self, what: &str, mut op: F, mut sleep: S) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
        S: FnMut(Duration),
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    warn!(attempt, attempts, "Giving up on {what}: {e}");
                    return Err(e);
                }
                Err(e) => {
                    warn!(attempt, attempts, "Retry {attempt} of {attempts} for {what}: {e}");
                    sleep(self.backoff());
                    attempt += 1;
                }
            }
        }
    }
}
