//! Per-request state.
//!
//! The [`RequestState`] carries everything a pipeline accumulates while
//! processing one request: extracted parameters, the parsed body, the
//! attached contract documents, and the response-check capability. The
//! router creates one state per request and destroys it when the response
//! is written; nothing in it is shared across requests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::features::{ResponseValidator, ValidationRejection};

/// Unique identifier for a request (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// State that flows through a pipeline for one request.
///
/// Steps enrich the state in order: the router fills in path and query
/// parameters, the document-attachment step adds the contract documents,
/// coercion and default steps rewrite parameter values in place, and the
/// response-check step installs a validation capability the terminal
/// handler may invoke.
///
/// # Example
///
/// ```
/// use daedalus_core::context::RequestState;
/// use serde_json::Value;
///
/// let mut state = RequestState::new();
/// state.set_path_param("petId", Value::String("42".into()));
///
/// assert_eq!(state.path_param("petId"), Some(&Value::String("42".into())));
/// ```
pub struct RequestState {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Path parameters extracted by the router, in path order.
    path_params: IndexMap<String, Value>,

    /// Query parameters, in query-string order.
    query_params: IndexMap<String, Value>,

    /// Parsed request body, when the media type allowed parsing.
    body: Option<Value>,

    /// The full API document, attached per operation.
    api_document: Option<Arc<Value>>,

    /// The operation's own document fragment.
    operation_document: Option<Arc<Value>>,

    /// Response-validation capability installed by the pipeline.
    response_check: Option<Arc<dyn ResponseValidator>>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data for opaque steps.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestState {
    /// Creates a new state with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a state with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            path_params: IndexMap::new(),
            query_params: IndexMap::new(),
            body: None,
            api_document: None,
            operation_document: None,
            response_check: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn path_params(&self) -> &IndexMap<String, Value> {
        &self.path_params
    }

    /// Returns the path parameters for in-place mutation (coercion, defaults).
    pub fn path_params_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.path_params
    }

    /// Sets a single path parameter.
    pub fn set_path_param(&mut self, name: impl Into<String>, value: Value) {
        self.path_params.insert(name.into(), value);
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&Value> {
        self.path_params.get(name)
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, Value> {
        &self.query_params
    }

    /// Returns the query parameters for in-place mutation.
    pub fn query_params_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.query_params
    }

    /// Sets a single query parameter.
    pub fn set_query_param(&mut self, name: impl Into<String>, value: Value) {
        self.query_params.insert(name.into(), value);
    }

    /// Returns a query parameter by name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&Value> {
        self.query_params.get(name)
    }

    /// Returns the parsed request body, if one was parsed.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the parsed body for in-place mutation.
    pub fn body_mut(&mut self) -> &mut Option<Value> {
        &mut self.body
    }

    /// Sets the parsed request body.
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Attaches the API document and the operation document.
    ///
    /// Called by the document-attachment step so downstream steps and the
    /// terminal handler can read the contract.
    pub fn attach_documents(&mut self, api: Arc<Value>, operation: Arc<Value>) {
        self.api_document = Some(api);
        self.operation_document = Some(operation);
    }

    /// Returns the attached API document.
    #[must_use]
    pub fn api_document(&self) -> Option<&Arc<Value>> {
        self.api_document.as_ref()
    }

    /// Returns the attached operation document.
    #[must_use]
    pub fn operation_document(&self) -> Option<&Arc<Value>> {
        self.operation_document.as_ref()
    }

    /// Installs the response-validation capability.
    pub fn install_response_check(&mut self, validator: Arc<dyn ResponseValidator>) {
        self.response_check = Some(validator);
    }

    /// Returns `true` if a response-validation capability is installed.
    #[must_use]
    pub fn has_response_check(&self) -> bool {
        self.response_check.is_some()
    }

    /// Validates a candidate response against the operation's declared schema.
    ///
    /// Returns `Ok(())` when no capability is installed; the capability is
    /// optional per operation and its absence is not an error.
    pub fn check_response(
        &self,
        status: http::StatusCode,
        body: &Value,
    ) -> Result<(), ValidationRejection> {
        match &self.response_check {
            Some(validator) => validator.validate(status, body),
            None => Ok(()),
        }
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// Extensions let opaque steps stash per-request data that later steps
    /// or the handler can retrieve.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestState")
            .field("request_id", &self.request_id)
            .field("path_params", &self.path_params)
            .field("query_params", &self.query_params)
            .field("body", &self.body)
            .field("has_api_document", &self.api_document.is_some())
            .field("has_operation_document", &self.operation_document.is_some())
            .field("has_response_check", &self.response_check.is_some())
            .finish_non_exhaustive()
    }
}
