//! Retry and backoff policy.
//!
//! This module holds the retry engine (`retry`), the policy it runs under,
//! the error taxonomy, and the classifiers that decide which attempt errors
//! are worth another try. It knows nothing about HTTP beyond the status
//! classification; the executor in `crate::fetch` plugs requests into it.

mod backoff;
pub mod classify;
mod error;
mod policy;
mod run;

pub use backoff::Backoff;
pub use classify::{classify_http_status, Classifier, StatusClass};
pub use error::{FetchError, RetryError};
pub use policy::RetryPolicy;
pub use run::retry;
