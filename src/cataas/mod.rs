//! Cat as a Service API client
//!
//! Wraps the HTTP transport behind the [`CatApi`] trait so the retry policy
//! can be exercised without a network.

mod fetch;
mod urls;

pub use fetch::{fetch_with_retry, RetryPolicy};
pub use urls::CatUrls;

use crate::config::get_cataas_http_timeout_secs;
use bytes::Bytes;
use reqwest::Client as HttpClient;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching from the cat API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a status other than 200
    #[error("{0}")]
    Status(u16),
    /// The request never got a response (connect, DNS, timeout...)
    #[error("{0}")]
    Transport(String),
    /// The response body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether another attempt may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Status(500) | Self::Transport(_))
    }
}

/// Raw answer of a single GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, empty for non-200 answers
    pub body: Bytes,
}

impl ApiResponse {
    /// Successful response carrying `body`
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Bodiless response with `status`
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }
}

/// Transport used to reach the cat API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatApi: Send + Sync {
    /// Perform one GET request.
    ///
    /// Any HTTP status is a successful transport result; only faults that
    /// prevent a response map to [`FetchError::Transport`].
    async fn get(&self, url: &str) -> Result<ApiResponse, FetchError>;
}

/// [`CatApi`] over `reqwest`
pub struct HttpCatApi {
    client: HttpClient,
}

impl HttpCatApi {
    /// Creates a client with the configured per-request timeout.
    ///
    /// Uses `CATAAS_HTTP_TIMEOUT_SECS` environment variable or 30s default.
    #[must_use]
    pub fn new() -> Self {
        let timeout = Duration::from_secs(get_cataas_http_timeout_secs());
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self { client }
    }
}

impl Default for HttpCatApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatApi for HttpCatApi {
    async fn get(&self, url: &str) -> Result<ApiResponse, FetchError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(ApiResponse::status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

/// Cat API client shared by all handlers
pub struct CatClient {
    api: Box<dyn CatApi>,
    urls: CatUrls,
    policy: RetryPolicy,
}

impl CatClient {
    /// Create a client over `api`
    #[must_use]
    pub fn new(api: Box<dyn CatApi>, urls: CatUrls, policy: RetryPolicy) -> Self {
        Self { api, urls, policy }
    }

    /// URL builder for this client's base
    #[must_use]
    pub const fn urls(&self) -> &CatUrls {
        &self.urls
    }

    /// Fetch image bytes, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`FetchError`] once the retry policy gives up.
    pub async fn image(&self, url: &str) -> Result<Bytes, FetchError> {
        fetch_with_retry(self.api.as_ref(), url, self.policy).await
    }

    /// Fetch the upstream tag list in a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Status`] on non-200 answers,
    /// [`FetchError::Transport`] on network faults and
    /// [`FetchError::Decode`] if the body is not a JSON array of strings.
    pub async fn tags(&self) -> Result<Vec<String>, FetchError> {
        let response = self.api.get(&self.urls.tags()).await?;
        if response.status != 200 {
            return Err(FetchError::Status(response.status));
        }
        serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn client_with(api: MockCatApi) -> CatClient {
        CatClient::new(
            Box::new(api),
            CatUrls::new("http://cats.test"),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Status(500).is_transient());
        assert!(FetchError::Transport("timeout".into()).is_transient());
        assert!(!FetchError::Status(404).is_transient());
        assert!(!FetchError::Status(503).is_transient());
        assert!(!FetchError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_error_display_is_bare_reason() {
        assert_eq!(FetchError::Status(404).to_string(), "404");
        assert_eq!(
            FetchError::Transport("connection refused".into()).to_string(),
            "connection refused"
        );
    }

    #[tokio::test]
    async fn test_tags_parses_json_array() {
        let mut api = MockCatApi::new();
        api.expect_get()
            .with(eq("http://cats.test/api/tags"))
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(r#"["cute","black"]"#)));

        let tags = client_with(api).tags().await;
        assert_eq!(tags, Ok(vec!["cute".to_string(), "black".to_string()]));
    }

    #[tokio::test]
    async fn test_tags_is_not_retried() {
        let mut api = MockCatApi::new();
        api.expect_get()
            .times(1)
            .returning(|_| Ok(ApiResponse::status(500)));

        assert_eq!(client_with(api).tags().await, Err(FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_tags_rejects_bad_body() {
        let mut api = MockCatApi::new();
        api.expect_get()
            .returning(|_| Ok(ApiResponse::ok("<html>")));

        assert!(matches!(
            client_with(api).tags().await,
            Err(FetchError::Decode(_))
        ));
    }
}
