//! reqwest-backed upstream with explicit timeout and retry.
//!
//! Transient failures (connect errors, timeouts, HTTP 429 and 5xx) are retried
//! with exponential backoff starting at [`ClientConfig::retry_backoff`]. Other
//! 4xx statuses are permanent and returned as-is for [`super::classify`].

use std::time::Duration;

use ine_models::schema::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
use reqwest::{StatusCode, Url};

use super::{Upstream, UpstreamRequest, UpstreamResponse};
use crate::error::{IneError, IneResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Connection settings for [`HttpUpstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub language: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            user_agent: concat!("ine-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub const fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.retry_backoff.saturating_mul(factor)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Upstream backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base: Url,
    config: ClientConfig,
}

impl HttpUpstream {
    /// Builds the HTTP client.
    ///
    /// # Errors
    /// Returns `IneError::InvalidParams` for an unusable base URL or language
    /// and `IneError::Http` if the client cannot be constructed.
    pub fn new(config: ClientConfig) -> IneResult<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| IneError::invalid("base_url", err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(IneError::invalid("base_url", "URL cannot carry a path"));
        }
        if config.language.trim().is_empty() {
            return Err(IneError::invalid("language", "must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves `{base}/{language}/{function}/{inputs..}`, percent-encoding
    /// each input as a single path segment.
    #[must_use]
    pub fn url_for(&self, request: &UpstreamRequest) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(self.config.language.trim())
                .push(request.function)
                .extend(request.inputs.iter().map(String::as_str));
        }
        url
    }
}

impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> IneResult<UpstreamResponse> {
        let url = self.url_for(request);
        let path = request.path();
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            tracing::debug!(%url, attempt, "GET upstream");
            let result = self
                .client
                .get(url.clone())
                .query(&request.query)
                .send()
                .await;

            match result {
                Err(err) if is_transient(&err) && attempt < max_retries => {
                    tracing::warn!(path = %path, error = %err, "transient upstream error");
                }
                Err(err) if err.is_timeout() => return Err(IneError::Timeout { path }),
                Err(err) => return Err(IneError::Http(err)),
                Ok(response) if is_retryable_status(response.status()) && attempt < max_retries => {
                    tracing::warn!(path = %path, status = %response.status(), "retryable upstream status");
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.map_err(|err| {
                        if err.is_timeout() {
                            IneError::Timeout { path: path.clone() }
                        } else {
                            IneError::Http(err)
                        }
                    })?;
                    return Ok(UpstreamResponse { status, body });
                }
            }

            attempt += 1;
            let delay = self.config.backoff_for(attempt);
            tracing::warn!(path = %path, "retry {attempt}/{max_retries} in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = ClientConfig::default().with_retry_backoff(Duration::from_millis(100));
        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn builds_function_urls_with_encoded_inputs() {
        let upstream = HttpUpstream::new(ClientConfig::default()).expect("client should build");
        let request = UpstreamRequest::new("DATOS_SERIE").with_input("IPC 1/2");
        assert_eq!(
            upstream.url_for(&request).as_str(),
            "https://servicios.ine.es/wstempus/js/ES/DATOS_SERIE/IPC%201%2F2"
        );
    }

    #[test]
    fn rejects_relative_base_urls() {
        let err = HttpUpstream::new(ClientConfig::new("servicios.ine.es")).unwrap_err();
        assert!(err.is_invalid_params());
    }
}
