//! Per-request dispatch and failure rendering.
//!
//! [`Router::dispatch`] is the execution contract the compiled pipelines run
//! under: one request-scoped [`RequestState`] is created, the matched
//! handler runs to completion, and a terminal failure is rendered by the
//! registered error renderer for the route's base path, falling back to the
//! default rendering when none is registered.

use http::{header, StatusCode};
use serde_json::Value;

use daedalus_core::context::RequestState;
use daedalus_core::error::Failure;
use daedalus_core::types::{Request, Response, ResponseExt};

use crate::router::Router;

/// Renders terminal failures for all routes under one base path.
///
/// The analogue of an error-handling middleware: registered on the router so
/// failures raised by any step are centrally converted to responses.
pub trait ErrorRenderer: Send + Sync + 'static {
    /// Converts a failure into the response to serve.
    fn render(&self, state: &RequestState, failure: &Failure) -> Response;
}

/// The default failure rendering, used when no renderer is registered.
///
/// - Validation failures respond with the validator's status code and its
///   structured payload verbatim as a JSON body.
/// - Security rejections respond with the rejection's status and message;
///   a challenge value is surfaced via `WWW-Authenticate`.
/// - Anything else becomes a `500` JSON envelope.
#[must_use]
pub fn render_failure(failure: &Failure) -> Response {
    match failure {
        Failure::Validation { status, errors } => Response::json(*status, errors),
        Failure::Security {
            status,
            message,
            challenge,
        } => {
            let mut response = Response::error(*status, message);
            if let Some(challenge) = challenge {
                if let Ok(value) = header::HeaderValue::from_str(challenge) {
                    response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                }
            }
            response
        }
        Failure::Internal(error) => Response::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            &error.to_string(),
        ),
    }
}

/// The default not-found response.
#[must_use]
pub fn not_found(path: &str) -> Response {
    Response::json(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path
        }),
    )
}

impl Router {
    /// Handles one buffered request end to end.
    ///
    /// Creates the per-request state, extracts path and query parameters,
    /// opportunistically parses a JSON body, runs the matched handler, and
    /// renders any terminal failure. Unmatched requests get a JSON 404.
    pub async fn dispatch(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let Some(matched) = self.match_route(&method, &path) else {
            tracing::debug!(%method, %path, "no route matched");
            return not_found(&path);
        };

        let (handler, params) = matched.into_parts();

        let mut state = RequestState::new();
        for (name, value) in params {
            state.set_path_param(name, Value::String(value));
        }
        populate_query(&mut state, request.uri().query());
        populate_json_body(&mut state, &request);

        match handler.call(&mut state, request).await {
            Ok(response) => response,
            Err(failure) => match self.error_renderer_for(&path) {
                Some(renderer) => renderer.render(&state, &failure),
                None => render_failure(&failure),
            },
        }
    }
}

/// Splits the raw query string into the state's query parameters.
///
/// Values are stored as raw strings; percent-decoding is left to the
/// coercer/validator, which know the declared parameter types.
fn populate_query(state: &mut RequestState, query: Option<&str>) {
    let Some(query) = query else { return };

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((name, value)) => {
                state.set_query_param(name, Value::String(value.to_string()));
            }
            None => {
                state.set_query_param(pair, Value::String(String::new()));
            }
        }
    }
}

/// Parses a JSON body into the state when the media type allows it.
///
/// Parse errors leave the body unset; a request validator that requires a
/// body rejects the request downstream.
fn populate_json_body(state: &mut RequestState, request: &Request) {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !is_json || request.body().is_empty() {
        return;
    }

    if let Ok(value) = serde_json::from_slice::<Value>(request.body()) {
        state.set_body(value);
    }
}
