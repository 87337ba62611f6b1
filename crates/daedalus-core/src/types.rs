//! Common HTTP types used throughout the binding pipeline.
//!
//! This module re-exports the HTTP request and response types shared by
//! steps, handlers, and the router.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type flowing through a pipeline.
///
/// The body is fully buffered before a pipeline runs, so validation and
/// coercion steps can inspect it without suspending.
pub type Request = http::Request<Bytes>;

/// The HTTP response type produced by a pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Creates a plain-text error response with the given status and message.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON error response with a machine-readable code.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;

    /// Creates a JSON response from an arbitrary value.
    fn json(status: http::StatusCode, value: &serde_json::Value) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        Self::json(status, &body)
    }

    fn json(status: http::StatusCode, value: &serde_json::Value) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(value.to_string())))
            .expect("failed to build JSON response")
    }
}
