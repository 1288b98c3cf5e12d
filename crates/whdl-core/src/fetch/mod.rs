//! Blocking HTTP GET helpers on top of libcurl.
//!
//! Every call runs on the current thread; wrap in `spawn_blocking` when used
//! from async code. Handles are reusable: a caller paging through an API keeps
//! one `Easy` so the connection stays alive between requests.

mod body;

pub use body::{get_json, stream_to, Transferred};

use crate::retry::FetchError;
use curl::easy::{Easy, List};
use std::time::Duration;

/// Connect timeout applied to every handle (the overall timeout is per call site).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a request expects back; decides the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Json,
    Any,
}

/// Build a GET handle with the shared request settings.
pub fn new_handle(user_agent: &str, timeout: Duration, accept: Accept) -> Result<Easy, FetchError> {
    let mut easy = Easy::new();
    easy.useragent(user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
    easy.timeout(timeout)?;

    let mut list = List::new();
    match accept {
        Accept::Json => list.append("Accept: application/json")?,
        Accept::Any => list.append("Accept: */*")?,
    }
    easy.http_headers(list)?;
    Ok(easy)
}
