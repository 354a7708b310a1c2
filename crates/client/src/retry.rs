//! Retry with exponential backoff for transient API failures.
//!
//! Only rate limiting (HTTP 429) and timeouts are retried. Every other
//! failure ends the request immediately.
//!
//! ```text
//! delay(attempt_index) = base_delay * 2^attempt_index
//! ```
//!
//! With the defaults (3 attempts, 3s base) a request that keeps timing out
//! waits 3s, then 6s, then gives up.

use std::future::Future;
use std::time::Duration;

use drugbit_core::AppConfig;

use crate::api::ApiError;

/// Default maximum attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self::new(config.max_attempts, config.retry_base_delay())
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay before the retry that follows failed attempt `attempt_index` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Delay to wait after `error` on attempt `attempt_index`, or `None` to give up.
    #[must_use]
    pub fn backoff(&self, error: &ApiError, attempt_index: u32) -> Option<Duration> {
        if !error.is_transient() || attempt_index + 1 >= self.max_attempts {
            return None;
        }
        Some(self.delay_for(attempt_index))
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `operation` receives the 0-based attempt index.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => match self.backoff(&error, attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            request = label,
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            "{}, retrying in {:?}",
                            error,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        if error.is_transient() {
                            tracing::error!(request = label, attempts = attempt + 1, "giving up: {}", error);
                        }
                        return Err(error);
                    }
                },
            }
        }
    }
}
