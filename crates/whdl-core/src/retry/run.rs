//! Retry loop: run a closure until success or the policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the retry policy says to stop.
/// `f` receives the 1-based attempt number. On a retryable failure the
/// thread sleeps for the backoff delay before the next attempt.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, ?kind, delay_ms = d.as_millis() as u64, "request failed: {}", e);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
            step: Duration::ZERO,
            retry_status: false,
        }
    }

    fn transient() -> FetchError {
        FetchError::PartialTransfer {
            expected: 2,
            received: 1,
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let out = run_with_retry(&fast_policy(), |attempt| {
            calls += 1;
            if attempt < 3 {
                Err(transient())
            } else {
                Ok(attempt)
            }
        })
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast_policy(), |_| {
            calls += 1;
            Err(transient())
        });
        assert!(res.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn http_status_stops_immediately() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast_policy(), |_| {
            calls += 1;
            Err(FetchError::Http(500))
        });
        assert!(matches!(res, Err(FetchError::Http(500))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn http_status_uses_every_attempt_when_enabled() {
        let policy = RetryPolicy {
            retry_status: true,
            ..fast_policy()
        };
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&policy, |_| {
            calls += 1;
            Err(FetchError::Http(429))
        });
        assert!(matches!(res, Err(FetchError::Http(429))));
        assert_eq!(calls, 3);
    }
}
