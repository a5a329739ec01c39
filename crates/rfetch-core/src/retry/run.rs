//! Retry loop: run an attempt closure until success, a permanent error,
//! cancellation, or an exhausted budget.

use std::time::Duration;

use super::backoff::Backoff;
use super::error::{FetchError, RetryError};
use super::policy::RetryPolicy;
use crate::context::Context;

/// Calls `f` with the zero-based attempt index until it succeeds or the
/// policy says to stop. At most `policy.retries_budget() + 1` calls are made.
///
/// The context is checked before every attempt; a context that is already
/// done means `f` is never called. Cancellation is not observed while `f`
/// runs or while the loop sleeps between attempts, only at the next check.
/// Blocks the calling thread for the backoff sleeps.
pub fn retry<T, F>(ctx: &Context, policy: &RetryPolicy, f: F) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    retry_with_sleep(ctx, policy, std::thread::sleep, f)
}

/// `retry` with the sleep function injected, so tests can record the waits.
pub(crate) fn retry_with_sleep<T, F, S>(
    ctx: &Context,
    policy: &RetryPolicy,
    mut sleep: S,
    mut f: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
    S: FnMut(Duration),
{
    let retries = policy.retries_budget();
    let mut backoff = Backoff::new(policy.min_wait_duration(), policy.max_wait_duration());
    let mut attempt = 0u32;
    loop {
        if let Some(e) = ctx.err() {
            tracing::debug!("retry stopped before attempt {}: {}", attempt, e);
            return Err(RetryError::Cancelled(e));
        }
        let err = match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        if !policy.should_retry(&err) {
            tracing::debug!("attempt {} failed permanently: {}", attempt, err);
            return Err(RetryError::Permanent(err));
        }
        if attempt >= retries {
            tracing::warn!("giving up after {} retries: {}", retries, err);
            return Err(RetryError::Exhausted {
                retries,
                source: err,
            });
        }
        let wait = backoff.next_wait();
        tracing::debug!(
            "attempt {} failed ({}), retrying in {:?}",
            attempt,
            err,
            wait
        );
        sleep(wait);
        attempt += 1;
    }
}
