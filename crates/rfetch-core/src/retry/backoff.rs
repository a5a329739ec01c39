//! Exponential backoff state for one retry sequence.

use std::time::Duration;

/// Doubling wait, capped at `max`. Starts at `min(initial, max)`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    wait: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            wait: initial.min(max),
            max,
        }
    }

    /// Wait to use for the upcoming retry.
    pub fn current(&self) -> Duration {
        self.wait
    }

    /// Return the current wait and advance: double it, saturating, then cap at `max`.
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.wait;
        self.wait = self.wait.saturating_mul(2).min(self.max);
        wait
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_wait())
    }
}
