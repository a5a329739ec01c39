//! Execution context for a fetch: cancellation tokens, an optional deadline,
//! and an optional transport override.
//!
//! A `Context` is cheap to clone and is passed by reference into the retry
//! engine and the request executor. Cancellation is cooperative: the retry loop
//! polls `err()` before every attempt. A derived context is done as soon as any
//! of its ancestors is done.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::transport::Transport;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// `CancelHandle::cancel` was called on this context or an ancestor.
    #[error("context canceled")]
    Cancelled,
    /// The context deadline has passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Handle that cancels the context returned alongside it by `Context::with_cancel`.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Mark the context (and everything derived from it) as cancelled.
    pub fn cancel(&self) {
        self.token.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Default)]
pub struct Context {
    tokens: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
    transport: Option<Arc<dyn Transport>>,
}

impl Context {
    /// Root context: never cancelled, no deadline, default transport.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a cancellable child context.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let token = Arc::new(AtomicBool::new(false));
        let mut child = self.clone();
        child.tokens.push(Arc::clone(&token));
        (child, CancelHandle { token })
    }

    /// Derive a child that is done at `deadline` (or earlier, if the parent's deadline is earlier).
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        child
    }

    /// Derive a child that is done `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child whose requests go through `transport` instead of the default.
    /// Used primarily by tests to substitute a scripted transport.
    pub fn with_transport(&self, transport: Arc<dyn Transport>) -> Context {
        let mut child = self.clone();
        child.transport = Some(transport);
        child
    }

    /// Transport override, if one was installed with `with_transport`.
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason this context is done, or `None` while it is still live.
    /// Cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.tokens.iter().any(|t| t.load(Ordering::Relaxed)) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancel_tokens", &self.tokens.len())
            .field("deadline", &self.deadline)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
