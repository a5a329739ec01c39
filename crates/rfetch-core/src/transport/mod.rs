//! One-shot HTTP GET transports.
//!
//! A `Transport` performs exactly one request and reports what came back,
//! without judging the status code; mapping statuses to success or retriable
//! errors is the executor's job (`crate::fetch`). The default implementation
//! uses libcurl (`CurlTransport`); tests install their own through
//! `Context::with_transport`.

mod easy;
mod parse;

use serde::de::DeserializeOwned;
use std::borrow::Cow;
use url::Url;

use crate::retry::{classify_http_status, StatusClass};

pub use easy::CurlTransport;
pub use parse::reason_phrase;

/// Performs a single GET request.
///
/// Implementations must be callable from any thread; the retry engine calls
/// `get` once per attempt from the caller's thread.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<Response, TransportError>;
}

/// Failure before any HTTP status was obtained (DNS, connect, timeout, ...).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error.
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// I/O failure from a non-curl transport.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A complete HTTP response: status, headers and the fully read body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u32,
    status_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Builds a response with the canonical status line for `status`
    /// (e.g. `"404 Not Found"`).
    pub fn new(status: u32, body: impl Into<Vec<u8>>) -> Self {
        let status_line = match reason_phrase(status) {
            "" => status.to_string(),
            reason => format!("{} {}", status, reason),
        };
        Self {
            status,
            status_line,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub(crate) fn from_parts(
        status: u32,
        status_line: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            status,
            status_line,
            headers,
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    /// Status code plus reason phrase, as sent by the server (e.g. `"403 Forbidden"`).
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as a reader (`&[u8]` implements `std::io::Read`).
    pub fn reader(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// True for 2xx.
    pub fn is_success(&self) -> bool {
        classify_http_status(self.status) == StatusClass::Success
    }

    /// True for 5xx, the statuses the executor tags retriable.
    pub fn is_server_error(&self) -> bool {
        classify_http_status(self.status) == StatusClass::Retriable
    }
}
