//! Fixed backoff ladder for search fetches.

use std::time::Duration;

use crate::error::ForemanResult;

/// Blocks the caller between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Delays between consecutive attempts.
///
/// A policy with `n` delays makes at most `n + 1` attempts. Every retryable
/// error is retried the same way; there is no status-aware backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    /// 5s, then 15s, then 60s: four attempts, 80s of waiting at most.
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(5),
            Duration::from_secs(15),
            Duration::from_secs(60),
        ])
    }
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Longest time spent sleeping before the last failure is returned.
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the ladder is exhausted.
    ///
    /// `operation` receives the 1-based attempt number. The error of the
    /// final attempt is returned unchanged.
    pub fn run<T, F>(&self, sleeper: &dyn Sleeper, mut operation: F) -> ForemanResult<T>
    where
        F: FnMut(usize) -> ForemanResult<T>,
    {
        let mut attempt = 1;
        loop {
            let err = match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            let Some(delay) = self.delays.get(attempt - 1).copied() else {
                tracing::warn!(
                    attempt,
                    max_attempts = self.max_attempts(),
                    error = %err,
                    "Request failed, giving up"
                );
                return Err(err);
            };

            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts(),
                delay_secs = delay.as_secs_f64(),
                error = %err,
                "Request failed, retrying"
            );
            sleeper.sleep(delay);
            attempt += 1;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::Sleeper;

    /// Records requested delays instead of sleeping.
    #[derive(Default)]
    pub struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }

        pub fn total(&self) -> Duration {
            self.slept().iter().sum()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }
}
