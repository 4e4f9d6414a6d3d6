//! Client for the Maoyang REST backend.
//!
//! # Architecture
//!
//! - The backend owns every record; the storefront never stores products,
//!   orders or members itself
//! - Requests carry the member's bearer token from the session
//! - The order catalog and ingredient list are cached via `moka`
//!
//! Endpoint groups live in submodules as `impl BackendClient` blocks.

mod cache;
mod catalog;
mod members;
mod notifications;
mod orders;

pub use catalog::RuleScope;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token missing, expired or rejected.
    #[error("Not authorized")]
    Unauthorized,

    /// Backend rate limited us.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Backend processed the request but refused it.
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// `{ "results": [...] }`
#[derive(Deserialize)]
struct Results<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// `{ "result": {...} }`
#[derive(Deserialize)]
struct Single<T> {
    result: T,
}

/// `{ "message": "success", ... }`
#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    message: Option<String>,
}

const SUCCESS: &str = "success";

/// Maximum number of body characters kept in logs and errors.
const BODY_SNIPPET: usize = 300;

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET).collect()
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the backend endpoints the storefront uses.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("maoyang-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                endpoint: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, format!("{}{path}", self.inner.endpoint))
    }

    fn authed(&self, method: Method, path: &str, token: &SecretString) -> RequestBuilder {
        self.request(method, path).bearer_auth(token.expose_secret())
    }

    /// Whether the backend answers HTTP at all. Any status counts.
    pub async fn ping(&self) -> bool {
        self.request(Method::GET, "/").send().await.is_ok()
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(snippet(&body))),
            s => {
                tracing::error!(
                    status = %s,
                    body = %snippet(&body),
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: s.as_u16(),
                    message: snippet(&body),
                })
            }
        }
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a write request, ignoring any body.
    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    /// Send a write request whose body must say `"message": "success"`.
    async fn execute_ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let ack: Ack = self.execute(request).await?;
        match ack.message.as_deref() {
            Some(SUCCESS) => Ok(()),
            other => Err(ApiError::Rejected(
                other.unwrap_or("no message").to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_endpoint_drops_trailing_slash() {
        let client = BackendClient::new(&ApiConfig {
            base_url: url::Url::parse("http://localhost:8080/api/").unwrap(),
            timeout: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(client.inner.endpoint, "http://localhost:8080/api");
    }

    #[test]
    fn test_envelopes() {
        let r: Results<u32> = serde_json::from_str(r#"{"results":[1,2]}"#).unwrap();
        assert_eq!(r.results, vec![1, 2]);
        let r: Results<u32> = serde_json::from_str("{}").unwrap();
        assert!(r.results.is_empty());
        let s: Single<u32> = serde_json::from_str(r#"{"result":7}"#).unwrap();
        assert_eq!(s.result, 7);
    }

    #[test]
    fn test_results_of_records_without_default() {
        let r: Results<maoyang_core::Product> =
            serde_json::from_str(r#"{"results":[{"id":1,"name":"Mango Smoothie"}]}"#).unwrap();
        assert_eq!(r.results.len(), 1);
        let r: Results<maoyang_core::OrderLine> = serde_json::from_str("{}").unwrap();
        assert!(r.results.is_empty());
    }

    #[test]
    fn test_snippet_truncates() {
        assert_eq!(snippet(&"x".repeat(1000)).len(), BODY_SNIPPET);
    }
}
