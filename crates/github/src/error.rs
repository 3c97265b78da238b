//! Error types for the GitHub REST client.

use std::time::Duration;

use onboarding::{DirectoryError, DirectoryErrorKind, RetryPolicy};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorBody;

/// Errors that can occur when talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Network-level error during HTTP communication.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Token missing, expired, or revoked.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Token lacks the permission required (e.g. `admin:org`).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Primary or secondary rate limit hit.
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Server-suggested wait from `Retry-After` or `x-ratelimit-reset`.
        retry_after: Option<Duration>,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 422 Unprocessable Entity, e.g. an invitation that already exists.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// GitHub API returned another non-success status.
    #[error("GitHub API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Invalid or unparseable response.
    #[error("Invalid response from GitHub: {0}")]
    InvalidResponse(String),

    /// Client configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GitHubError {
    /// Classifies a non-success response.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let message = ErrorBody::summarize(body, status);

        match status.as_u16() {
            401 => GitHubError::Unauthorized { message },
            403 | 429 if is_rate_limited(status, headers, &message) => GitHubError::RateLimited {
                retry_after: retry_after(headers),
            },
            403 => GitHubError::Forbidden { message },
            404 => GitHubError::NotFound { message },
            422 => GitHubError::Validation { message },
            code => GitHubError::ApiError {
                status: code,
                message,
            },
        }
    }

    /// Whether and when the failed request may be re-issued.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            GitHubError::Network(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                RetryPolicy::Retryable { after: None }
            }
            GitHubError::RateLimited { retry_after } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            GitHubError::ApiError { status, .. } if *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// Maps this error onto the port's classification.
    pub fn kind(&self) -> DirectoryErrorKind {
        match self {
            GitHubError::Unauthorized { .. } => DirectoryErrorKind::Unauthorized,
            GitHubError::Forbidden { .. } => DirectoryErrorKind::Forbidden,
            GitHubError::RateLimited { .. } => DirectoryErrorKind::RateLimited,
            GitHubError::NotFound { .. } => DirectoryErrorKind::NotFound,
            GitHubError::Validation { .. } => DirectoryErrorKind::Validation,
            GitHubError::Network(_) => DirectoryErrorKind::Transient,
            GitHubError::ApiError { status, .. } if *status >= 500 => DirectoryErrorKind::Transient,
            GitHubError::ApiError { .. }
            | GitHubError::InvalidResponse(_)
            | GitHubError::Config(_) => DirectoryErrorKind::Other,
        }
    }
}

impl From<GitHubError> for DirectoryError {
    fn from(err: GitHubError) -> Self {
        DirectoryError::new(err.kind(), err.to_string())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap, message: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || header_str(headers, "x-ratelimit-remaining") == Some("0")
        || headers.contains_key("retry-after")
        || message.to_ascii_lowercase().contains("rate limit")
}

/// Reads `Retry-After` (seconds) or, failing that, `x-ratelimit-reset`
/// (epoch seconds).
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(secs) = header_str(headers, "retry-after").and_then(|v| v.parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }
    let reset = header_str(headers, "x-ratelimit-reset")?.parse::<i64>().ok()?;
    let now = chrono::Utc::now().timestamp();
    Some(Duration::from_secs(reset.saturating_sub(now).max(0) as u64))
}
