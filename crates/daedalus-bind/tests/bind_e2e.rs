//! End-to-end binding tests.
//!
//! These tests bind a small pet-store description to a real router and
//! drive it through `Router::dispatch`, verifying the externally observable
//! contract:
//!
//! - the compiled chain runs in the fixed order, consumes middleware in
//!   declared order between defaults and security
//! - a validation failure aborts the chain before coercion, defaults,
//!   security, and the handler
//! - security rejections surface status, message, and challenge header
//! - disabled features leave only additional steps and the handler
//! - the document route is served (and patched) only when exposure is on

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{header, Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};

use daedalus_bind::{BindConfig, Binder};
use daedalus_core::context::RequestState;
use daedalus_core::descriptor::{ApiRoot, OperationDescriptor};
use daedalus_core::features::{
    Coercer, DefaultSetter, FeatureSet, RequestValidator, ResponseValidator, SecurityHandler,
    SecurityRejection, ValidationRejection,
};
use daedalus_core::handler::{FnHandler, OperationHandler};
use daedalus_core::step::{BoxFuture, FnStep, Step};
use daedalus_core::types::{Request, Response, ResponseExt};
use daedalus_router::{ErrorRenderer, Router};

type Trace = Arc<Mutex<Vec<&'static str>>>;

fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

fn recorded(trace: &Trace) -> Vec<&'static str> {
    trace.lock().unwrap().clone()
}

struct RecordingValidator {
    trace: Trace,
    reject: bool,
}

impl RequestValidator for RecordingValidator {
    fn validate(
        &self,
        _state: &RequestState,
        _request: &Request,
    ) -> Result<(), ValidationRejection> {
        self.trace.lock().unwrap().push("validate");
        if self.reject {
            return Err(ValidationRejection::bad_request(json!({
                "errors": [{"code": "SCHEMA_MISMATCH", "message": "request rejected"}]
            })));
        }
        Ok(())
    }
}

struct PassResponses;

impl ResponseValidator for PassResponses {
    fn validate(&self, _status: StatusCode, _body: &Value) -> Result<(), ValidationRejection> {
        Ok(())
    }
}

struct NumericCoercer {
    trace: Trace,
}

impl Coercer for NumericCoercer {
    fn coerce(&self, state: &mut RequestState) {
        self.trace.lock().unwrap().push("coerce");
        for value in state.path_params_mut().values_mut() {
            if let Some(n) = value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                *value = Value::from(n);
            }
        }
    }
}

struct LimitDefault {
    trace: Trace,
}

impl DefaultSetter for LimitDefault {
    fn apply(&self, state: &mut RequestState) {
        self.trace.lock().unwrap().push("defaults");
        if state.query_param("limit").is_none() {
            state.set_query_param("limit", Value::from(20));
        }
    }
}

struct KeyCheck {
    trace: Trace,
    challenge: Option<&'static str>,
}

impl SecurityHandler for KeyCheck {
    fn authenticate<'a>(
        &'a self,
        _state: &'a RequestState,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<(), SecurityRejection>> {
        Box::pin(async move {
            self.trace.lock().unwrap().push("security");
            if request.headers().contains_key("x-api-key") {
                return Ok(());
            }
            let mut rejection = SecurityRejection::unauthorized("missing API key");
            if let Some(challenge) = self.challenge {
                rejection = rejection.with_challenge(challenge);
            }
            Err(rejection)
        })
    }
}

fn recording_step(name: &'static str, trace: &Trace) -> Arc<dyn Step> {
    let trace = Arc::clone(trace);
    Arc::new(FnStep::new(name, move |_state: &mut RequestState| {
        trace.lock().unwrap().push(name);
        Ok(())
    }))
}

fn echo_handler(trace: &Trace) -> Arc<dyn OperationHandler> {
    let trace = Arc::clone(trace);
    Arc::new(FnHandler::new(move |state, _request| {
        trace.lock().unwrap().push("handler");
        let body = json!({
            "path_params": state.path_params(),
            "query_params": state.query_params(),
            "has_response_check": state.has_response_check(),
            "has_documents": state.operation_document().is_some(),
        });
        Box::pin(async move { Ok(Response::json(StatusCode::OK, &body)) })
    }))
}

fn full_features(trace: &Trace, challenge: Option<&'static str>, reject: bool) -> FeatureSet {
    FeatureSet::new()
        .with_response_validator(Arc::new(PassResponses))
        .with_request_validator(Arc::new(RecordingValidator {
            trace: Arc::clone(trace),
            reject,
        }))
        .with_coercer(Arc::new(NumericCoercer {
            trace: Arc::clone(trace),
        }))
        .with_default_setter(Arc::new(LimitDefault {
            trace: Arc::clone(trace),
        }))
        .with_security_handler(Arc::new(KeyCheck {
            trace: Arc::clone(trace),
            challenge,
        }))
}

fn pet_root(document: Value, operation: OperationDescriptor) -> ApiRoot {
    ApiRoot::new("/v2", Arc::new(document)).with_operation(operation)
}

fn get_pet_descriptor(
    features: FeatureSet,
    handler: Arc<dyn OperationHandler>,
) -> OperationDescriptor {
    OperationDescriptor::builder(Method::GET, "/pets/{petId}", handler)
        .base_path("/v2")
        .api_document(Arc::new(json!({"openapi": "3.0.0"})))
        .operation_document(Arc::new(json!({"operationId": "getPet"})))
        .features(features)
        .consumes(["application/json", "application/xml"])
        .build()
}

fn bind_router(config: BindConfig, roots: &[ApiRoot]) -> Router {
    let mut router = Router::new();
    Binder::new(config).bind(&mut router, roots).unwrap();
    router
}

fn get(uri: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-api-key", "secret")
        .body(Bytes::new())
        .unwrap()
}

fn get_anonymous(uri: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_full_chain_runs_in_fixed_order() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );

    let config = BindConfig::builder()
        .consumes_step("application/json", recording_step("json_body", &trace))
        .consumes_step("application/xml", recording_step("xml_body", &trace))
        .build();
    let router = bind_router(config, &[pet_root(json!({"openapi": "3.0.0"}), descriptor)]);

    let response = router.dispatch(get("/v2/pets/42")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Consumes middleware sits between defaults and security, in the
    // operation's declared order.
    assert_eq!(
        recorded(&trace),
        vec![
            "validate", "coerce", "defaults", "json_body", "xml_body", "security", "handler"
        ]
    );
}

#[tokio::test]
async fn test_pipeline_equips_state_before_handler() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let body = body_json(router.dispatch(get("/v2/pets/42?limit=5")).await).await;

    // Coercion rewrote the path parameter, defaults left the explicit limit
    // alone, and the response-check capability plus documents were attached.
    assert_eq!(body["path_params"]["petId"], 42);
    assert_eq!(body["query_params"]["limit"], "5");
    assert_eq!(body["has_response_check"], true);
    assert_eq!(body["has_documents"], true);
}

#[tokio::test]
async fn test_default_applied_for_absent_parameter() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let body = body_json(router.dispatch(get("/v2/pets/42")).await).await;
    assert_eq!(body["query_params"]["limit"], 20);
}

#[tokio::test]
async fn test_validation_failure_skips_everything_downstream() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, true),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let response = router.dispatch(get("/v2/pets/42")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Only the validator ran: no coercion, defaults, security, or handler.
    assert_eq!(recorded(&trace), vec!["validate"]);

    // The validator's structured payload is served verbatim.
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], "SCHEMA_MISMATCH");
}

#[tokio::test]
async fn test_security_rejection_with_challenge() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, Some("ApiKey realm=\"pets\""), false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let response = router.dispatch(get_anonymous("/v2/pets/42")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("ApiKey realm=\"pets\"")
    );
    assert!(!recorded(&trace).contains(&"handler"));
    assert_eq!(body_text(response).await, "missing API key");
}

#[tokio::test]
async fn test_security_rejection_without_challenge_omits_header() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let response = router.dispatch(get_anonymous("/v2/pets/42")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
}

#[tokio::test]
async fn test_features_disabled_leaves_additional_steps_and_handler() {
    let trace = trace();
    let handler = echo_handler(&trace);
    let descriptor = OperationDescriptor::builder(Method::GET, "/pets/{petId}", handler)
        .base_path("/v2")
        .operation_document(Arc::new(json!({"operationId": "getPet"})))
        .features(full_features(&trace, None, false))
        .features_enabled(false)
        .additional_step(recording_step("probe", &trace))
        .build();
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let response = router.dispatch(get_anonymous("/v2/pets/42")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // No validator, coercer, defaults, or security ran.
    assert_eq!(recorded(&trace), vec!["probe", "handler"]);
}

#[tokio::test]
async fn test_docs_route_served_at_default_path() {
    let trace = trace();
    let document = json!({"openapi": "3.0.0", "info": {"title": "Pets"}});
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::default(),
        &[pet_root(document.clone(), descriptor)],
    );

    let response = router.dispatch(get_anonymous("/v2/api-docs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, document);
}

#[tokio::test]
async fn test_docs_route_disabled_falls_through_to_404() {
    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(
        BindConfig::builder().expose_api_docs(false).build(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    );

    let response = router.dispatch(get_anonymous("/v2/api-docs")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_document_served_with_live_host() {
    let trace = trace();
    let document = json!({"swagger": "2.0", "paths": {}});
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, false),
        echo_handler(&trace),
    );
    let router = bind_router(BindConfig::default(), &[pet_root(document, descriptor)]);

    let request = http::Request::builder()
        .method(Method::GET)
        .uri("/v2/api-docs")
        .header(header::HOST, "pets.example.com:8080")
        .body(Bytes::new())
        .unwrap();
    let body = body_json(router.dispatch(request).await).await;

    assert_eq!(body["host"], "pets.example.com:8080");
    assert_eq!(body["basePath"], "/v2");
}

#[tokio::test]
async fn test_error_renderer_centralizes_failures() {
    struct Enveloping;

    impl ErrorRenderer for Enveloping {
        fn render(
            &self,
            _state: &RequestState,
            failure: &daedalus_core::error::Failure,
        ) -> Response {
            Response::json_error(failure.status_code(), "HANDLED", "rendered centrally")
        }
    }

    let trace = trace();
    let descriptor = get_pet_descriptor(
        full_features(&trace, None, true),
        echo_handler(&trace),
    );
    let config = BindConfig::builder()
        .error_renderer(Arc::new(Enveloping))
        .build();
    let router = bind_router(config, &[pet_root(json!({"openapi": "3.0.0"}), descriptor)]);

    let response = router.dispatch(get("/v2/pets/42")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "HANDLED");
}

#[tokio::test]
async fn test_concurrent_requests_share_no_state() {
    let trace = trace();
    let counter = Arc::new(AtomicUsize::new(0));

    let handler: Arc<dyn OperationHandler> = {
        let counter = Arc::clone(&counter);
        Arc::new(FnHandler::new(move |state, _request| {
            counter.fetch_add(1, Ordering::SeqCst);
            let pet_id = state.path_param("petId").cloned().unwrap_or(Value::Null);
            Box::pin(async move { Ok(Response::json(StatusCode::OK, &json!({"petId": pet_id}))) })
        }))
    };

    let descriptor = get_pet_descriptor(full_features(&trace, None, false), handler);
    let router = Arc::new(bind_router(
        BindConfig::default(),
        &[pet_root(json!({"openapi": "3.0.0"}), descriptor)],
    ));

    let mut handles = Vec::new();
    for id in 0..8 {
        let router = Arc::clone(&router);
        handles.push(tokio::spawn(async move {
            let response = router.dispatch(get(&format!("/v2/pets/{id}"))).await;
            (id, body_json(response).await)
        }));
    }

    for handle in handles {
        let (id, body) = handle.await.unwrap();
        // Each in-flight request saw its own state: its own coerced petId.
        assert_eq!(body["petId"], id);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 8);
}
