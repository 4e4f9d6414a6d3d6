//! Client for the admin side of the Maoyang REST backend.
//!
//! Used by the admin console and by `maoyang-cli`. Every request carries the
//! admin's bearer token. The ingredient list is cached and invalidated when
//! an ingredient is added. Products are always read fresh so stock is current.

mod cache;
mod catalog;
mod notifications;
mod orders;

pub use orders::OrderTable;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Token missing, expired or rejected.
    #[error("Not authorized")]
    Unauthorized,

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

const SUCCESS: &str = "success";

const BODY_SNIPPET: usize = 300;

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET).collect()
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    phone: &'a str,
    pass: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

// =============================================================================
// AdminClient
// =============================================================================

/// Client for the backend endpoints the admin console uses.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl AdminClient {
    /// Create a new admin client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("maoyang-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Exchange admin credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the backend does not know the admin.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, phone: &str, password: &SecretString) -> Result<SecretString, ApiError> {
        let request = self.request(Method::POST, "/admin/signin").json(&SignInRequest {
            phone,
            pass: password.expose_secret(),
        });

        let response: SignInResponse = self.execute(request).await?;
        match (response.message.as_deref(), response.token) {
            (Some(SUCCESS), Some(token)) if !token.is_empty() => Ok(SecretString::from(token)),
            (message, _) => Err(ApiError::Rejected(
                message.unwrap_or("sign-in failed").to_string(),
            )),
        }
    }

    /// Whether the backend answers HTTP at all. Any status counts.
    pub async fn ping(&self) -> bool {
        self.request(Method::GET, "/").send().await.is_ok()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, format!("{}{path}", self.inner.endpoint))
    }

    fn authed(&self, method: Method, path: &str, token: &SecretString) -> RequestBuilder {
        self.request(method, path).bearer_auth(token.expose_secret())
    }

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
                tracing::error!(status = %s, body = %snippet(&body), "Backend returned non-success status");
                Err(ApiError::Status {
                    status: s.as_u16(),
                    message: snippet(&body),
                })
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %snippet(&body), "Failed to parse backend response");
            ApiError::Parse(e)
        })
    }

    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_results_of_records_without_default() {
        let r: Results<maoyang_core::OrderLine> = serde_json::from_str(
            r#"{"results":[{"orderNumber":"1-1","userId":1,"productId":2,"quantity":1}]}"#,
        )
        .unwrap();
        assert_eq!(r.results.len(), 1);
        let r: Results<maoyang_core::Product> = serde_json::from_str("{}").unwrap();
        assert!(r.results.is_empty());
    }

    #[test]
    fn test_sign_in_response_shapes() {
        let ok: SignInResponse =
            serde_json::from_str(r#"{"message":"success","token":"abc"}"#).unwrap();
        assert_eq!(ok.message.as_deref(), Some(SUCCESS));
        assert_eq!(ok.token.as_deref(), Some("abc"));

        let denied: SignInResponse = serde_json::from_str(r#"{"message":"not found"}"#).unwrap();
        assert!(denied.token.is_none());
    }
}
