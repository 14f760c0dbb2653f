use std::{thread, time::Duration};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounded retry with exponential backoff and optional jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let max_extra = delay.as_millis() as u64 / 2;
        if !self.jitter || max_extra == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::rng().random_range(0..=max_extra))
    }

    /// Run `operation` until it succeeds, fails with an error `is_transient`
    /// rejects, or `max_attempts` is exhausted. The last error is returned.
    pub fn retry<T, E, F, P>(&self, mut operation: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && is_transient(&err) => {
                    let delay = self.jittered(self.delay_for(attempt));
                    tracing::warn!(
                        "attempt {attempt}/{max_attempts} failed: {err}; retrying in {delay:?}"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// I/O failures worth another attempt.
pub fn is_transient_io(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        err.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter: false,
        }
    }

    #[test]
    fn exponential_delays_are_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            jitter: false,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(200), Duration::from_millis(1_000));
    }

    #[test]
    fn jitter_adds_at_most_half() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.jittered(Duration::from_millis(100));
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn retries_transient_errors_until_success() {
        let calls = Cell::new(0);
        let result: Result<u32, io::Error> = fast().retry(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(io::Error::from(io::ErrorKind::Interrupted))
                } else {
                    Ok(7)
                }
            },
            is_transient_io,
        );
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn stops_on_permanent_error() {
        let calls = Cell::new(0);
        let result: Result<(), io::Error> = fast().retry(
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(io::ErrorKind::NotFound))
            },
            is_transient_io,
        );
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<(), io::Error> = fast().retry(
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(io::ErrorKind::TimedOut))
            },
            is_transient_io,
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn none_policy_runs_once() {
        let calls = Cell::new(0);
        let _: Result<(), io::Error> = RetryPolicy::none().retry(
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(io::ErrorKind::Interrupted))
            },
            is_transient_io,
        );
        assert_eq!(calls.get(), 1);
    }
}
