//! Attempt-level and sequence-level error types.

use crate::context::ContextError;
use crate::transport::{Response, TransportError};

/// Error returned by a single attempt.
///
/// Retriability is carried explicitly by the `Retriable` tag; every other
/// variant is permanent unless a custom classifier says otherwise.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transient failure that may succeed on another attempt.
    #[error(transparent)]
    Retriable(Box<FetchError>),
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Only `http` and `https` URLs are fetched.
    #[error("unsupported protocol scheme {scheme:?} in {url:?}")]
    UnsupportedScheme { url: String, scheme: String },
    /// No HTTP status was obtained (DNS, connection refused, timeout, ...).
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
    /// Non-2xx response. The full response is kept for inspection.
    #[error("url: {url}, response code {}, body: {}", .response.status_line(), .response.text())]
    Status { url: String, response: Box<Response> },
    /// Successful response whose body could not be decoded.
    #[error("decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// Failure from a caller-defined attempt.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FetchError {
    /// Tag `err` as retriable. Already-tagged errors are not wrapped twice.
    pub fn retriable(err: impl Into<FetchError>) -> Self {
        match err.into() {
            e @ FetchError::Retriable(_) => e,
            e => FetchError::Retriable(Box::new(e)),
        }
    }

    /// True iff this error carries the `Retriable` tag.
    pub fn is_retriable(&self) -> bool {
        matches!(self, FetchError::Retriable(_))
    }

    /// The error underneath the retriable tag (or `self` when untagged).
    pub fn inner(&self) -> &FetchError {
        match self {
            FetchError::Retriable(e) => e.inner(),
            e => e,
        }
    }

    /// Strip the retriable tag.
    pub fn into_inner(self) -> FetchError {
        match self {
            FetchError::Retriable(e) => (*e).into_inner(),
            e => e,
        }
    }

    /// Response that produced this error, for non-2xx statuses.
    pub fn response(&self) -> Option<&Response> {
        match self.inner() {
            FetchError::Status { response, .. } => Some(&**response),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self.into_inner() {
            FetchError::Status { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// Transport failure underneath this error, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self.inner() {
            FetchError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Final outcome of a retry sequence that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The context was done before an attempt could start.
    #[error("retry cancelled: {0}")]
    Cancelled(#[source] ContextError),
    /// The classifier rejected the error; no further attempts were made.
    #[error("non-retriable error: {0}")]
    Permanent(#[source] FetchError),
    /// Every attempt failed with a retriable error.
    #[error("retries exhausted after {retries} retries: {source}")]
    Exhausted {
        retries: u32,
        #[source]
        source: FetchError,
    },
}

impl RetryError {
    /// Last attempt error, if the sequence got far enough to make one.
    pub fn cause(&self) -> Option<&FetchError> {
        match self {
            RetryError::Cancelled(_) => None,
            RetryError::Permanent(e) | RetryError::Exhausted { source: e, .. } => Some(e),
        }
    }

    pub fn into_cause(self) -> Option<FetchError> {
        match self {
            RetryError::Cancelled(_) => None,
            RetryError::Permanent(e) | RetryError::Exhausted { source: e, .. } => Some(e),
        }
    }

    /// Response from the last attempt, when it failed with a non-2xx status.
    pub fn response(&self) -> Option<&Response> {
        self.cause().and_then(FetchError::response)
    }

    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            RetryError::Cancelled(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}
