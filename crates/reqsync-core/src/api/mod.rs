//! REST client for the requirements-management service
//!
//! Provides a typed async client over the service's HTTP contract:
//! - Authentication (login, register, current user)
//! - Project CRUD
//! - Requirement CRUD, state transitions, and change history
//! - Document (DRS) generation
//!
//! Every call except login/register sends the stored bearer token. Non-2xx
//! statuses map onto the error taxonomy and are never retried.

pub mod auth;
pub mod documents;
pub mod projects;
pub mod requirements;

pub use auth::User;
pub use projects::{Project, ProjectDraft};
pub use requirements::{HistoryEntry, Requirement, RequirementDraft, RequirementState};

use std::time::Duration;

use reqwest::{Client as HttpClient, Method, RequestBuilder};

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::error::{Error, Result};

/// Client for the requirements-management service
///
/// Thread-safe and cheap to clone. Constructed from [`Config`] plus the
/// stored bearer token, or through [`ApiClientBuilder`] directly.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    generation_timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Builder for creating an ApiClient
pub struct ApiClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
    generation_timeout_secs: Option<u64>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: None,
            generation_timeout_secs: None,
        }
    }

    /// Set the service origin (defaults to the stock local origin)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token sent with protected calls
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout for ordinary calls
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the deadline applied to document-generation requests
    pub fn generation_timeout_secs(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = Some(secs);
        self
    }

    /// Build the ApiClient
    pub fn build(self) -> Result<ApiClient> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(self.timeout_secs.unwrap_or(30)))
            .build()?;

        Ok(ApiClient {
            http,
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token: self.token,
            generation_timeout: Duration::from_secs(self.generation_timeout_secs.unwrap_or(120)),
        })
    }
}

impl ApiClient {
    /// Create a new builder for ApiClient
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Create a client from configuration, without a token
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder()
            .base_url(config.api.resolved_base_url())
            .timeout_secs(config.api.timeout_secs)
            .generation_timeout_secs(config.generation.timeout_secs)
            .build()
    }

    /// Attach a bearer token to an existing client
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the configured service origin
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is attached
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the bearer token applied when present
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }

    /// Map a non-2xx response onto the error taxonomy
    ///
    /// 401 means the stored session is no longer valid; everything else is
    /// surfaced with its status and body, and the operation is aborted.
    pub(crate) async fn error_response<T>(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(Error::SessionRejected),
            code => Err(Error::RequestFailed(code, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = ApiClient::builder().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let client = ApiClient::builder()
            .base_url("https://reqs.example.com/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://reqs.example.com");
        assert_eq!(
            client.endpoint("/projetos"),
            "https://reqs.example.com/projetos"
        );
    }

    #[test]
    fn test_with_token() {
        let client = ApiClient::builder().build().unwrap().with_token("tok");
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let client = ApiClient::builder()
            .token("secret-token")
            .build()
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("authenticated"));
    }

    #[test]
    fn test_client_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiClient>();
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.api.base_url = "http://10.1.1.1:8000".to_string();
        config.generation.timeout_secs = 60;

        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.1.1.1:8000");
        assert_eq!(client.generation_timeout(), Duration::from_secs(60));
    }
}
