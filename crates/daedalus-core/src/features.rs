//! Optional per-operation capabilities.
//!
//! An operation's contract metadata is turned into capability objects by an
//! external validation/security subsystem; this module defines the traits
//! those objects implement and the [`FeatureSet`] record that groups them.
//! A capability that is absent simply has no step in the compiled pipeline;
//! presence is checked with plain `Option` inspection, never downcasting.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use crate::context::RequestState;
use crate::step::BoxFuture;
use crate::types::Request;

/// A request-validation rejection carrying the validator's verbatim result.
#[derive(Debug, Clone)]
pub struct ValidationRejection {
    /// HTTP status code for the failure response.
    pub status: StatusCode,
    /// Structured error payload, served as the response body unchanged.
    pub errors: Value,
}

impl ValidationRejection {
    /// Creates a rejection with an explicit status code.
    #[must_use]
    pub fn new(status: StatusCode, errors: Value) -> Self {
        Self { status, errors }
    }

    /// Creates a `400 Bad Request` rejection.
    #[must_use]
    pub fn bad_request(errors: Value) -> Self {
        Self::new(StatusCode::BAD_REQUEST, errors)
    }
}

/// A security rejection: status, message, and an optional challenge.
#[derive(Debug, Clone)]
pub struct SecurityRejection {
    /// HTTP status code for the failure response.
    pub status: StatusCode,
    /// Human-readable message, served as the response body.
    pub message: String,
    /// Authentication challenge surfaced via `WWW-Authenticate`.
    pub challenge: Option<String>,
}

impl SecurityRejection {
    /// Creates a rejection with an explicit status code.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            challenge: None,
        }
    }

    /// Creates a `401 Unauthorized` rejection.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a `403 Forbidden` rejection.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Attaches an authentication challenge value.
    #[must_use]
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }
}

/// Validates the incoming request against the operation's declared schema.
///
/// Invoked eagerly by the request-validation step. A rejection aborts the
/// pipeline immediately.
pub trait RequestValidator: Send + Sync + 'static {
    /// Validates the request (body, headers, path and query parameters).
    fn validate(&self, state: &RequestState, request: &Request)
        -> Result<(), ValidationRejection>;
}

/// Validates a candidate response against the operation's declared schema.
///
/// Not invoked eagerly: the pipeline installs it on the request state as a
/// capability the terminal handler may use before writing its response.
pub trait ResponseValidator: Send + Sync + 'static {
    /// Validates a status code and candidate response body.
    fn validate(&self, status: StatusCode, body: &Value) -> Result<(), ValidationRejection>;
}

/// Rewrites the request's typed fields in place (e.g. string-to-number path
/// parameters) according to the declared schema.
///
/// Coercion has no failure path: the request-validation step runs earlier
/// and is expected to have caught malformed input.
pub trait Coercer: Send + Sync + 'static {
    /// Coerces the request state's fields in place.
    fn coerce(&self, state: &mut RequestState);
}

/// Fills in declared default values for absent optional fields.
pub trait DefaultSetter: Send + Sync + 'static {
    /// Applies defaults to the request state in place.
    fn apply(&self, state: &mut RequestState);
}

/// Authenticates and authorizes the request.
///
/// The handler resolves asynchronously to either allow the chain to proceed
/// or reject with a status, message, and optional challenge.
pub trait SecurityHandler: Send + Sync + 'static {
    /// Decides whether the request may proceed.
    fn authenticate<'a>(
        &'a self,
        state: &'a RequestState,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<(), SecurityRejection>>;
}

/// The optional capabilities declared for one operation.
///
/// A fixed-shape record: each field either holds a capability object or is
/// absent, in which case the corresponding pipeline step is omitted entirely
/// (no no-op placeholder is inserted).
#[derive(Clone, Default)]
pub struct FeatureSet {
    response_validator: Option<Arc<dyn ResponseValidator>>,
    request_validator: Option<Arc<dyn RequestValidator>>,
    coercer: Option<Arc<dyn Coercer>>,
    default_setter: Option<Arc<dyn DefaultSetter>>,
    security_handler: Option<Arc<dyn SecurityHandler>>,
}

impl FeatureSet {
    /// Creates an empty feature set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response validator.
    #[must_use]
    pub fn with_response_validator(mut self, validator: Arc<dyn ResponseValidator>) -> Self {
        self.response_validator = Some(validator);
        self
    }

    /// Sets the request validator.
    #[must_use]
    pub fn with_request_validator(mut self, validator: Arc<dyn RequestValidator>) -> Self {
        self.request_validator = Some(validator);
        self
    }

    /// Sets the coercer.
    #[must_use]
    pub fn with_coercer(mut self, coercer: Arc<dyn Coercer>) -> Self {
        self.coercer = Some(coercer);
        self
    }

    /// Sets the default setter.
    #[must_use]
    pub fn with_default_setter(mut self, setter: Arc<dyn DefaultSetter>) -> Self {
        self.default_setter = Some(setter);
        self
    }

    /// Sets the security handler.
    #[must_use]
    pub fn with_security_handler(mut self, handler: Arc<dyn SecurityHandler>) -> Self {
        self.security_handler = Some(handler);
        self
    }

    /// Returns the response validator, if declared.
    #[must_use]
    pub fn response_validator(&self) -> Option<&Arc<dyn ResponseValidator>> {
        self.response_validator.as_ref()
    }

    /// Returns the request validator, if declared.
    #[must_use]
    pub fn request_validator(&self) -> Option<&Arc<dyn RequestValidator>> {
        self.request_validator.as_ref()
    }

    /// Returns the coercer, if declared.
    #[must_use]
    pub fn coercer(&self) -> Option<&Arc<dyn Coercer>> {
        self.coercer.as_ref()
    }

    /// Returns the default setter, if declared.
    #[must_use]
    pub fn default_setter(&self) -> Option<&Arc<dyn DefaultSetter>> {
        self.default_setter.as_ref()
    }

    /// Returns the security handler, if declared.
    #[must_use]
    pub fn security_handler(&self) -> Option<&Arc<dyn SecurityHandler>> {
        self.security_handler.as_ref()
    }

    /// Returns `true` if no capability is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.response_validator.is_none()
            && self.request_validator.is_none()
            && self.coercer.is_none()
            && self.default_setter.is_none()
            && self.security_handler.is_none()
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSet")
            .field("response_validator", &self.response_validator.is_some())
            .field("request_validator", &self.request_validator.is_some())
            .field("coercer", &self.coercer.is_some())
            .field("default_setter", &self.default_setter.is_some())
            .field("security_handler", &self.security_handler.is_some())
            .finish()
    }
}
