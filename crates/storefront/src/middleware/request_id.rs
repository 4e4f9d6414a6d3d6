//! Request ID middleware for request tracing and correlation.
//!
//! An `x-request-id` supplied by a proxy is kept when it looks sane; otherwise
//! a UUID v4 is generated. The ID is recorded on the current span, tagged on
//! the Sentry scope and echoed in the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted.
const MAX_UPSTREAM_LEN: usize = 128;

/// Pick the request ID for a request.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_UPSTREAM_LEN
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id(request.headers());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(value) {
            headers.insert(REQUEST_ID_HEADER, v);
        }
        headers
    }

    #[test]
    fn test_keeps_upstream_id() {
        assert_eq!(request_id(&headers("cf-abc_123.x")), "cf-abc_123.x");
    }

    #[test]
    fn test_replaces_suspicious_ids() {
        for bad in ["", "has space", "quote\"", &"a".repeat(200)] {
            let id = request_id(&headers(bad));
            assert!(Uuid::parse_str(&id).is_ok(), "{bad:?} should be replaced");
        }
    }

    #[test]
    fn test_generates_when_missing() {
        assert!(Uuid::parse_str(&request_id(&HeaderMap::new())).is_ok());
    }
}
