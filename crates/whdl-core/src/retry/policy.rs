use std::time::Duration;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, short body).
    Connection,
    /// Response arrived but its body could not be decoded.
    Malformed,
    /// Server answered with a status other than 200.
    Status(u32),
    /// Any other error (never retried).
    Other,
}

impl ErrorKind {
    /// Transient kinds are worth another attempt.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Malformed
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Linear backoff: the delay before retry `n` is `base_delay + (n - 1) * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Added to the delay on every further retry.
    pub step: Duration,
    /// Non-200 statuses use up an attempt and are retried at once, without
    /// backoff. Off by default.
    pub retry_status: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            step: Duration::from_secs(2),
            retry_status: false,
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        if let ErrorKind::Status(_) = kind {
            return if self.retry_status {
                RetryDecision::RetryAfter(Duration::ZERO)
            } else {
                RetryDecision::NoRetry
            };
        }
        if !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        let extra = self.step.saturating_mul(attempt.saturating_sub(1));
        RetryDecision::RetryAfter(self.base_delay.saturating_add(extra))
    }
}
