//! HTTP plumbing for the GitHub REST API: authentication headers, retries with
//! back-off, and page-number pagination.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use onboarding::RetryPolicy;

use crate::config::API_VERSION;
use crate::{GitHubConfig, GitHubError};

/// Page size requested from list endpoints (the API maximum).
pub const PAGE_SIZE: usize = 100;

/// Hard stop for pagination: 100 pages of 100 is far beyond any class roster.
const MAX_PAGES: u32 = 100;

/// Typed client for the subset of the GitHub REST API used by org onboarding.
///
/// Implements [`onboarding::OrgDirectory`]; see `directory.rs`.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Builds a client from validated settings.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    /// Returns the settings this client was built with.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Sends a request once and turns non-success statuses into errors.
    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response, GitHubError> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(self.config.token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(GitHubError::from_response(status, &headers, &text))
    }

    /// Sends a request, retrying transient failures per [`crate::RetryConfig`].
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, GitHubError> {
        let url = self.url(path);
        let retry = &self.config.retry;
        let mut attempt = 1;

        loop {
            debug!(%method, %url, attempt, "GitHub request");
            let err = match self.send_once(&method, &url, body).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let delay = match err.retry_policy() {
                RetryPolicy::Retryable { after } if attempt < retry.max_attempts => {
                    after.unwrap_or_else(|| retry.backoff(attempt))
                }
                _ => return Err(err),
            };
            if delay > retry.max_server_wait {
                warn!(%method, %url, ?delay, "Requested wait exceeds the limit; giving up");
                return Err(err);
            }

            warn!(%method, %url, attempt, ?delay, error = %err, "Retrying GitHub request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        parse_json(response).await
    }

    /// Fetches every page of a list endpoint.
    ///
    /// Stops at the first page shorter than [`PAGE_SIZE`].
    pub(crate) async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, GitHubError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let page_path = format!("{path}{separator}per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<T> = self.get_json(&page_path).await?;
            let len = batch.len();
            items.extend(batch);
            if len < PAGE_SIZE {
                return Ok(items);
            }
        }

        warn!(path, pages = MAX_PAGES, "Pagination limit reached; results truncated");
        Ok(items)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitHubError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        parse_json(response).await
    }

    /// Sends a body and ignores whatever comes back.
    pub(crate) async fn send_without_reply<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), GitHubError> {
        self.send(method, path, Some(body)).await.map(|_| ())
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, GitHubError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| GitHubError::InvalidResponse(e.to_string()))
}

/// Encodes one path segment (org names come straight from the command line).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = GitHubConfig::new(SecretString::from("t".to_string()))
            .with_api_base_url("https://ghe.example.com/api/v3/");
        let client = GitHubClient::new(config).unwrap();
        assert_eq!(
            client.url("/orgs/acme"),
            "https://ghe.example.com/api/v3/orgs/acme"
        );
    }

    #[test]
    fn segment_escapes_reserved_characters() {
        assert_eq!(segment("acme"), "acme");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GitHubConfig::new(SecretString::from("t".to_string()))
            .with_api_base_url("ftp://example.com");
        assert!(matches!(GitHubClient::new(config), Err(GitHubError::Config(_))));
    }
}
