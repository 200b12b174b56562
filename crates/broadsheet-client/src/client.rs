use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;

use broadsheet_core::analytics::Tenant;
use broadsheet_core::config::Config;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{url} responded with {status}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid api url: {0}")]
    Url(String),

    #[error("request did not complete within {0:?}")]
    Budget(Duration),
}

impl ApiError {
    /// Connection failures and timeouts are worth another attempt; answers
    /// from the server are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Retry on transport failures with exponential backoff, bounded by a total
/// time budget per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(500),
            budget: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// HTTP client for the analytics platform's REST API.
///
/// Every request carries `Authorization: token <token>` and JSON
/// accept/content-type headers. The inner `reqwest::Client` pools
/// connections, so one instance is shared by all submissions.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, token, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        Self::new(&cfg.api_url, &cfg.api_token)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    /// `GET /analyses/<org>/<project>?page=1&only_success=true`
    pub async fn analyses_bytes(&self, tenant: &Tenant) -> Result<Vec<u8>, ApiError> {
        let mut url = self.endpoint(&["analyses", tenant.organisation.as_str(), tenant.project.as_str()])?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("only_success", "true");
        self.send(self.authorised(self.client.get(url))).await
    }

    /// `GET /projects/<org>/<project>/collections`
    pub async fn collections_bytes(&self, tenant: &Tenant) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["projects", tenant.organisation.as_str(), tenant.project.as_str(), "collections"])?;
        self.send(self.authorised(self.client.get(url))).await
    }

    /// `POST /projects/<org>/<project>/query[?size=N]`, returning the raw
    /// response body.
    pub async fn execute_query_bytes(
        &self,
        tenant: &Tenant,
        body: &Value,
        page_size: Option<u32>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut url = self.endpoint(&["projects", tenant.organisation.as_str(), tenant.project.as_str(), "query"])?;
        if let Some(size) = page_size {
            url.query_pairs_mut().append_pair("size", &size.to_string());
        }
        let request = self.authorised(self.client.post(url)).body(body.to_string());
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let deadline = Instant::now() + self.retry.budget;
        let mut attempt = 1;
        loop {
            let Some(this_try) = request.try_clone() else {
                return self.attempt(request).await;
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            let result = match tokio::time::timeout(remaining, self.attempt(this_try)).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Budget(self.retry.budget)),
            };
            match result {
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    if Instant::now() + delay >= deadline {
                        return Err(err);
                    }
                    tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying api request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn attempt(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let resp = request.send().await.map_err(ApiError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            let url = resp.url().to_string();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, url, body });
        }
        let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1_000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2_000));
    }

    #[test]
    fn endpoints_encode_tenant_segments() {
        let client = ApiClient::new("https://api.example.com/v1/", "t").expect("client");
        let url = client
            .endpoint(&["projects", "acme co", "demo/x", "query"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/projects/acme%20co/demo%2Fx/query"
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(matches!(ApiClient::new("not a url", "t"), Err(ApiError::Url(_))));
        assert!(matches!(
            ApiClient::new("mailto:ops@example.com", "t"),
            Err(ApiError::Url(_))
        ));
    }
}
