//! Classify HTTP statuses and attempt errors for retry decisions.

use std::io;
use std::sync::Arc;

use super::error::FetchError;
use crate::transport::TransportError;

/// Predicate deciding whether an attempt error is worth another attempt.
///
/// Must be a pure function of the error: the engine may call it once per
/// failed attempt from the caller's thread.
pub type Classifier = Arc<dyn Fn(&FetchError) -> bool + Send + Sync>;

/// Outcome class of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// 5xx: the server may recover.
    Retriable,
    /// Everything else (redirects that were not followed, 4xx, nonsense codes).
    Permanent,
}

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> StatusClass {
    match code {
        200..=299 => StatusClass::Success,
        500..=599 => StatusClass::Retriable,
        _ => StatusClass::Permanent,
    }
}

/// Default classifier: retry only errors tagged as retriable.
pub fn is_retriable(e: &FetchError) -> bool {
    e.is_retriable()
}

/// Classifier that also retries transient transport failures
/// (timeouts, refused or reset connections, DNS hiccups).
pub fn retry_transport_errors(e: &FetchError) -> bool {
    e.is_retriable() || e.transport_error().is_some_and(is_transient_transport_error)
}

/// True for transport failures that plausibly clear up on their own.
pub fn is_transient_transport_error(e: &TransportError) -> bool {
    match e {
        TransportError::Curl(ce) => is_transient_curl_error(ce),
        TransportError::Io(ie) => matches!(
            ie.kind(),
            io::ErrorKind::TimedOut
                | io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
        ),
    }
}

fn is_transient_curl_error(e: &curl::Error) -> bool {
    e.is_operation_timedout()
        || e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
}
