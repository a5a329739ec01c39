//! Request executor: one GET attempt, mapped onto the retry error taxonomy,
//! plus the retrying and JSON-decoding conveniences built on it.

mod query;

use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::retry::{self, classify_http_status, FetchError, RetryError, RetryPolicy, StatusClass};
use crate::transport::{CurlTransport, Response, Transport};

pub use query::Query;

/// Sends one GET to `uri` with optional query parameters.
///
/// Uses the transport installed in `ctx`, or a default `CurlTransport`.
/// Non-2xx responses come back as `FetchError::Status` carrying the response:
/// 5xx is tagged retriable, everything else is permanent. Transport failures
/// are permanent under the default classifier.
pub fn get(ctx: &Context, uri: &str, query: Option<&Query>) -> Result<Response, FetchError> {
    let url = query::build_url(uri, query)?;
    let response = match ctx.transport() {
        Some(transport) => transport.get(&url),
        None => CurlTransport::default().get(&url),
    }
    .map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })?;

    match classify_http_status(response.status()) {
        StatusClass::Success => Ok(response),
        StatusClass::Retriable => Err(FetchError::retriable(status_error(uri, response))),
        StatusClass::Permanent => Err(status_error(uri, response)),
    }
}

fn status_error(uri: &str, response: Response) -> FetchError {
    FetchError::Status {
        url: uri.to_string(),
        response: Box::new(response),
    }
}

/// Like `get`, retrying transient failures under `policy` (default policy when `None`).
pub fn get_retry(
    ctx: &Context,
    uri: &str,
    query: Option<&Query>,
    policy: Option<&RetryPolicy>,
) -> Result<Response, RetryError> {
    let default_policy;
    let policy = match policy {
        Some(p) => p,
        None => {
            default_policy = RetryPolicy::default();
            &default_policy
        }
    };
    retry::retry(ctx, policy, |attempt| {
        if attempt > 0 {
            tracing::info!("GET {} retry {}/{}", uri, attempt, policy.retries_budget());
        }
        get(ctx, uri, query)
    })
}

/// Fetches `uri` with retries and decodes the body as JSON.
///
/// A body that does not decode is a permanent failure; it is never retried.
pub fn fetch_json<T: DeserializeOwned>(
    ctx: &Context,
    uri: &str,
    query: Option<&Query>,
    policy: Option<&RetryPolicy>,
) -> Result<T, RetryError> {
    let response = get_retry(ctx, uri, query, policy)?;
    response.json().map_err(|source| {
        RetryError::Permanent(FetchError::Decode {
            url: uri.to_string(),
            source,
        })
    })
}

#[cfg(test)]
mod tests;
