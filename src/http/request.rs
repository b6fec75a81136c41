//! Request conversion and correlation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Convert an HTTP request into the transport-neutral `RawRequest`
//! - Reject bodies that are oversized, truncated or not UTF-8
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Header values that are not valid UTF-8 are converted lossily
//! - The body is collected but never parsed; handlers own body parsing

use axum::body::{to_bytes, Body};
use axum::http::{HeaderValue, Request};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::envelope::RawRequest;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Makes a fresh UUID v4 for every request without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Why an HTTP request could not be turned into a `RawRequest`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body could not be read: {0}")]
    Incomplete(String),

    #[error("request body is not valid UTF-8")]
    NotUtf8,
}

impl RequestError {
    pub fn status(&self) -> u16 {
        match self {
            RequestError::TooLarge { .. } => 413,
            RequestError::Incomplete(_) | RequestError::NotUtf8 => 400,
        }
    }
}

/// Collect `request` into a `RawRequest`, reading at most `limit` body bytes.
pub async fn into_raw_request(request: Request<Body>, limit: usize) -> Result<RawRequest, RequestError> {
    let (parts, body) = request.into_parts();

    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| body_error(e, limit))?;
    let body = if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8(bytes.to_vec()).map_err(|_| RequestError::NotUtf8)?)
    };

    Ok(RawRequest {
        method: parts.method.as_str().to_string(),
        url,
        headers,
        body,
    })
}

/// Only a tripped length limit is a 413; anything else failed mid-read.
fn body_error(err: axum::Error, limit: usize) -> RequestError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return RequestError::TooLarge { limit };
        }
        source = e.source();
    }
    RequestError::Incomplete(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_converts_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/hello?name=a")
            .header("X-Trace", "1")
            .header("x-trace", "2")
            .body(Body::from("{\"name\":\"Ada\"}"))
            .unwrap();

        let raw = into_raw_request(request, 1024).await.unwrap();
        assert_eq!(raw.method, "POST");
        assert_eq!(raw.url, "/api/hello?name=a");
        assert_eq!(raw.headers.len(), 2);
        assert_eq!(raw.body.as_deref(), Some("{\"name\":\"Ada\"}"));
    }

    #[tokio::test]
    async fn test_empty_body_is_absent() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let raw = into_raw_request(request, 1024).await.unwrap();
        assert_eq!(raw.body, None);
        assert_eq!(raw.method, "GET");
    }

    #[tokio::test]
    async fn test_rejects_bad_bodies() {
        let request = Request::builder().uri("/").body(Body::from(vec![0xff, 0xfe])).unwrap();
        let err = into_raw_request(request, 1024).await.unwrap_err();
        assert_eq!(err.status(), 400);

        let request = Request::builder().uri("/").body(Body::from("x".repeat(64))).unwrap();
        let err = into_raw_request(request, 16).await.unwrap_err();
        assert_eq!(err.status(), 413);
    }

    #[tokio::test]
    async fn test_body_errors_are_classified() {
        let err = to_bytes(Body::from("x".repeat(64)), 16).await.unwrap_err();
        assert!(matches!(body_error(err, 16), RequestError::TooLarge { limit: 16 }));

        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer went away");
        let err = body_error(axum::Error::new(reset), 16);
        assert!(matches!(err, RequestError::Incomplete(_)));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let request = Request::builder().body(()).unwrap();
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
