//! Error classification and retry policy for completion providers.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

const BASE_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Broad category of a completion provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// HTTP 429 from the provider.
    RateLimited,
    /// HTTP 5xx from the provider.
    ServerError,
    /// HTTP 4xx other than 429 (bad request, bad credentials, ...).
    ClientError,
    /// Transport failure: timeout, connection refused, DNS, ...
    NetworkError,
    /// Success status but a response body we could not make sense of.
    ParseError,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmErrorKind::RateLimited => "rate limited",
            LlmErrorKind::ServerError => "server error",
            LlmErrorKind::ClientError => "client error",
            LlmErrorKind::NetworkError => "network error",
            LlmErrorKind::ParseError => "parse error",
        };
        f.write_str(name)
    }
}

/// A failure talking to the completion provider.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// Provider-suggested delay from a Retry-After header.
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            message: message.into(),
            status: Some(429),
            retry_after,
        }
    }

    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            message: message.into(),
            status: Some(status),
            retry_after: None,
        }
    }

    pub fn client_error(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            message: message.into(),
            status: Some(status),
            retry_after: None,
        }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            message: message.into(),
            status: None,
            retry_after: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            message: message.into(),
            status: None,
            retry_after: None,
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }

    /// Delay to wait before retry attempt `attempt` (0-based).
    ///
    /// A provider-supplied Retry-After wins; otherwise exponential backoff
    /// from [`BASE_RETRY_DELAY`], capped at [`MAX_RETRY_DELAY`].
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(delay) = self.retry_after {
            return delay;
        }
        BASE_RETRY_DELAY
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_DELAY)
    }
}

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        _ => LlmErrorKind::ClientError,
    }
}

/// Retry policy for transient provider failures.
///
/// Client errors (4xx other than 429) are never retried; neither is
/// anything above the transport layer.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Hard cap on total time spent across attempts and waits.
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            max_retry_duration: Duration::ZERO,
        }
    }

    /// Whether this error should be retried at all under this policy.
    pub fn should_retry(&self, error: &LlmError) -> bool {
        self.max_retries > 0 && error.is_transient()
    }
}
