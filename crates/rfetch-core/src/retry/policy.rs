use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::classify::{self, Classifier};
use super::error::FetchError;
use crate::config::RetryConfig;

/// Retry budget, backoff bounds and the classifier deciding what to retry.
///
/// Immutable value: every builder method consumes the policy and returns the
/// updated one, so a policy shared between sequences can never change under
/// a running loop. Cloning is cheap (the classifier is reference counted).
///
/// ```
/// use rfetch_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .retries(1)
///     .min_wait(Duration::from_millis(1))
///     .max_wait(Duration::from_millis(10));
/// assert_eq!(policy.retries_budget(), 1);
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    retries: u32,
    min_wait: Duration,
    max_wait: Duration,
    classifier: Classifier,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(60),
            classifier: Arc::new(classify::is_retriable),
        }
    }
}

impl RetryPolicy {
    /// Default policy: 3 retries, 1s first wait, 60s ceiling, retry tagged errors only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retries after the first attempt; 0 means a single attempt.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Wait before the first retry.
    pub fn min_wait(mut self, wait: Duration) -> Self {
        self.min_wait = wait;
        self
    }

    /// Ceiling for the exponential backoff.
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    /// Replace the classifier. Only errors for which `f` returns true are retried.
    pub fn classifier<F>(mut self, f: F) -> Self
    where
        F: Fn(&FetchError) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(f);
        self
    }

    pub fn retries_budget(&self) -> u32 {
        self.retries
    }

    pub fn min_wait_duration(&self) -> Duration {
        self.min_wait
    }

    pub fn max_wait_duration(&self) -> Duration {
        self.max_wait
    }

    /// Apply the classifier.
    pub fn should_retry(&self, e: &FetchError) -> bool {
        (self.classifier)(e)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let policy = RetryPolicy::new()
            .retries(cfg.retries)
            .min_wait(Duration::from_millis(cfg.min_wait_ms))
            .max_wait(Duration::from_millis(cfg.max_wait_ms));
        if cfg.retry_transport_errors {
            policy.classifier(classify::retry_transport_errors)
        } else {
            policy
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retries", &self.retries)
            .field("min_wait", &self.min_wait)
            .field("max_wait", &self.max_wait)
            .finish_non_exhaustive()
    }
}
