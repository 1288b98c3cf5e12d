//! Fetch error type shared by every HTTP call.

use thiserror::Error;

/// Error returned by a single request (curl failure, HTTP status, body or storage failure).
/// Kept typed so the retry policy can classify it before it becomes an `anyhow::Error`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a status other than 200.
    #[error("HTTP {0}")]
    Http(u32),
    /// Response body was not the expected JSON document.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    /// Body ended before the declared `Content-Length`.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Local write failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}
