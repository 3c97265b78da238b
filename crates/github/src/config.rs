//! Connection settings for [`crate::GitHubClient`].

use std::time::Duration;

use secrecy::SecretString;

use crate::GitHubError;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned in every request.
pub const API_VERSION: &str = "2022-11-28";

/// Settings for the GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Base URL without trailing slash (GitHub Enterprise uses `https://host/api/v3`).
    pub api_base_url: String,
    /// Personal access token or `gh` CLI token.
    pub token: SecretString,
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl GitHubConfig {
    /// Creates a configuration for the public API with default settings.
    pub fn new(token: SecretString) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token,
            user_agent: format!("org-onboard/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Overrides the retry settings.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks the settings before a client is built.
    pub fn validate(&self) -> Result<(), GitHubError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(GitHubError::Config(format!(
                "API URL must start with http:// or https://, got '{url}'"
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(GitHubError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Exponential back-off for retryable failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Longest server-requested wait (rate limit reset) the client will honour
    /// before giving up on the request.
    pub max_server_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            max_server_wait: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): `initial * 2^(attempt-1)`,
    /// capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(1), Duration::from_millis(500));
        assert_eq!(retry.backoff(2), Duration::from_secs(1));
        assert_eq!(retry.backoff(3), Duration::from_secs(2));
        assert_eq!(retry.backoff(10), Duration::from_secs(10));
        assert_eq!(retry.backoff(64), Duration::from_secs(10));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let config = GitHubConfig::new(SecretString::from("t".to_string()));
        assert!(config.validate().is_ok());

        let bad_url = config.clone().with_api_base_url("api.github.com");
        assert!(matches!(bad_url.validate(), Err(GitHubError::Config(_))));

        let no_attempts = config.with_retry(RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        });
        assert!(no_attempts.validate().is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let config = GitHubConfig::new(SecretString::from("ghp_supersecret".to_string()));
        assert!(!format!("{config:?}").contains("ghp_supersecret"));
    }
}
