use std::time::Duration;

/// How an insert worker reacts to a failed insert
///
/// The default policy sleeps a fixed delay and retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_consecutive_failures: Option<u32>,
}

impl RetryPolicy {
    /// Fixed delay, no retry limit
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_consecutive_failures: None,
        }
    }

    /// Give up after `limit` failures in a row
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.max_consecutive_failures = Some(limit);
        self
    }

    /// Delay before the next attempt, or `None` once the worker should stop
    pub fn delay_after(&self, consecutive_failures: u32) -> Option<Duration> {
        match self.max_consecutive_failures {
            Some(limit) if consecutive_failures >= limit => None,
            _ => Some(self.delay),
        }
    }
}
