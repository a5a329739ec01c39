//! Retriable HTTP GET requests.
//!
//! Build a [`retry::RetryPolicy`], then either drive your own attempts with
//! [`retry::retry`] or use the executor helpers in [`fetch`]
//! (`get`, `get_retry`, `fetch_json`). Cancellation, deadlines and transport
//! substitution travel in a [`context::Context`].

pub mod config;
pub mod context;
pub mod fetch;
pub mod logging;
pub mod retry;
pub mod transport;

pub use context::{CancelHandle, Context, ContextError};
pub use fetch::{fetch_json, get, get_retry, Query};
pub use retry::{retry, FetchError, RetryError, RetryPolicy};
pub use transport::{CurlTransport, Response, Transport, TransportError};
