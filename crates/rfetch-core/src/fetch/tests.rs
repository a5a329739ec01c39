//! Executor tests against an in-memory scripted transport.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::*;
use crate::retry::classify;
use crate::transport::TransportError;

/// Plays back a fixed sequence of outcomes, repeating the last one, and
/// records every requested URL.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Response, io::ErrorKind>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<Response, io::ErrorKind>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn statuses(codes: &[u32]) -> Arc<Self> {
        Self::new(codes.iter().map(|&c| Ok(Response::new(c, ""))).collect())
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &Url) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        match next {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(kind)) => Err(TransportError::Io(io::Error::from(kind))),
            None => Ok(Response::new(200, "")),
        }
    }
}

fn ctx_for(transport: &Arc<ScriptedTransport>) -> Context {
    Context::background().with_transport(transport.clone())
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new()
        .min_wait(Duration::from_millis(1))
        .max_wait(Duration::from_millis(10))
}

const URL: &str = "http://test.invalid/path";

#[test]
fn get_returns_success_response() {
    let t = ScriptedTransport::new(vec![Ok(Response::new(200, "Test response"))]);
    let resp = get(&ctx_for(&t), URL, None).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text(), "Test response");
}

#[test]
fn get_sends_query() {
    let t = ScriptedTransport::statuses(&[200]);
    let q: Query = [("k1", "v1"), ("k2", "v2")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    get(&ctx_for(&t), URL, Some(&q)).unwrap();
    assert_eq!(t.requests()[0].query(), Some("k1=v1&k2=v2"));
}

#[test]
fn get_5xx_is_retriable_and_keeps_response() {
    let t = ScriptedTransport::new(vec![Ok(Response::new(503, "busy"))]);
    let err = get(&ctx_for(&t), URL, None).unwrap_err();
    assert!(err.is_retriable());
    assert_eq!(err.response().map(Response::status), Some(503));
}

#[test]
fn get_4xx_is_permanent_with_body_in_message() {
    let t = ScriptedTransport::new(vec![Ok(Response::new(403, "go away"))]);
    let err = get(&ctx_for(&t), URL, None).unwrap_err();
    assert!(!err.is_retriable());
    assert_eq!(err.response().map(Response::status), Some(403));
    assert_eq!(
        err.to_string(),
        format!("url: {}, response code 403 Forbidden, body: go away", URL)
    );
}

#[test]
fn get_transport_failure_is_permanent() {
    let t = ScriptedTransport::new(vec![Err(io::ErrorKind::ConnectionRefused)]);
    let err = get(&ctx_for(&t), URL, None).unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
    assert!(!err.is_retriable());
    assert!(err.response().is_none());
}

#[test]
fn get_rejects_non_http_urls_without_sending() {
    let t = ScriptedTransport::new(vec![Ok(Response::new(200, "local file contents"))]);
    for uri in ["file:///tmp/secret.txt", "ftp://example.com/data"] {
        let err = get(&ctx_for(&t), uri, None).unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { .. }));
        assert!(!err.to_string().contains("local file contents"));
    }
    assert!(t.requests().is_empty());

    let err = get_retry(&ctx_for(&t), "file:///tmp/secret.txt", None, Some(&fast_policy()))
        .unwrap_err();
    assert!(matches!(err, RetryError::Permanent(FetchError::UnsupportedScheme { .. })));
    assert!(t.requests().is_empty());
}

#[test]
fn get_retry_default_policy_first_try() {
    let t = ScriptedTransport::statuses(&[200]);
    let resp = get_retry(&ctx_for(&t), URL, None, None).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(t.requests().len(), 1);
}

#[test]
fn get_retry_retries_5xx_then_succeeds() {
    let t = ScriptedTransport::statuses(&[500, 200]);
    let resp = get_retry(&ctx_for(&t), URL, None, Some(&fast_policy())).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(t.requests().len(), 2);
}

#[test]
fn get_retry_does_not_retry_permanent_failure() {
    let t = ScriptedTransport::statuses(&[403, 200]);
    let err = get_retry(&ctx_for(&t), URL, None, Some(&fast_policy())).unwrap_err();
    assert!(matches!(err, RetryError::Permanent(_)));
    assert_eq!(err.response().map(Response::status), Some(403));
    assert_eq!(t.requests().len(), 1);
}

#[test]
fn get_retry_exhausts_on_persistent_5xx() {
    let t = ScriptedTransport::statuses(&[502]);
    let policy = fast_policy().retries(2);
    let err = get_retry(&ctx_for(&t), URL, None, Some(&policy)).unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.response().map(Response::status), Some(502));
    assert_eq!(t.requests().len(), 3);
}

#[test]
fn get_retry_transport_errors_only_with_opt_in_classifier() {
    let script = || {
        vec![
            Err(io::ErrorKind::ConnectionReset),
            Ok(Response::new(200, "ok")),
        ]
    };

    let t = ScriptedTransport::new(script());
    let err = get_retry(&ctx_for(&t), URL, None, Some(&fast_policy())).unwrap_err();
    assert!(matches!(err, RetryError::Permanent(FetchError::Transport { .. })));
    assert_eq!(t.requests().len(), 1);

    let t = ScriptedTransport::new(script());
    let policy = fast_policy().classifier(classify::retry_transport_errors);
    let resp = get_retry(&ctx_for(&t), URL, None, Some(&policy)).unwrap();
    assert_eq!(resp.text(), "ok");
    assert_eq!(t.requests().len(), 2);
}

#[test]
fn get_retry_cancelled_context_sends_nothing() {
    let t = ScriptedTransport::statuses(&[200]);
    let (ctx, handle) = ctx_for(&t).with_cancel();
    handle.cancel();
    let err = get_retry(&ctx, URL, None, None).unwrap_err();
    assert!(err.is_cancelled());
    assert!(t.requests().is_empty());
}

#[derive(Debug, Deserialize)]
struct FieldType {
    field: String,
}

#[test]
fn fetch_json_decodes_struct() {
    let t = ScriptedTransport::new(vec![Ok(Response::new(200, r#"{"field": "test value"}"#))]);
    let f: FieldType = fetch_json(&ctx_for(&t), URL, None, None).unwrap();
    assert_eq!(f.field, "test value");
}

#[test]
fn fetch_json_decode_failure_is_permanent_and_not_retried() {
    let t = ScriptedTransport::new(vec![
        Ok(Response::new(200, "not json")),
        Ok(Response::new(200, r#"{"field": "late"}"#)),
    ]);
    let err = fetch_json::<FieldType>(&ctx_for(&t), URL, None, Some(&fast_policy())).unwrap_err();
    assert!(matches!(err, RetryError::Permanent(FetchError::Decode { .. })));
    assert_eq!(t.requests().len(), 1);
}
