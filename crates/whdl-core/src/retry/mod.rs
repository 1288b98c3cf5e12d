//! Retry and backoff policy.
//!
//! Classifies fetch failures (timeouts, connection errors, malformed bodies,
//! HTTP statuses) and decides linear backoff so catalog paging and any other
//! retried request share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
