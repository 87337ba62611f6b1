//! Terminal failures raised by pipeline steps.
//!
//! A step that cannot let the request proceed raises a [`Failure`]. The
//! failure aborts the remaining steps and the terminal handler for that
//! request only; it is rendered into an HTTP response by the router's
//! error renderer (or the default rendering). The pipeline itself never
//! logs or swallows a failure.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::features::{SecurityRejection, ValidationRejection};

/// A terminal failure that halts all subsequent steps for one request.
#[derive(Debug, Error)]
pub enum Failure {
    /// Request validation failed. The status code and structured error
    /// payload come verbatim from the validator's result.
    #[error("request validation failed ({status})")]
    Validation {
        /// HTTP status code to respond with.
        status: StatusCode,
        /// Structured error payload, served as the response body.
        errors: Value,
    },

    /// A security handler rejected the request.
    #[error("security rejection ({status}): {message}")]
    Security {
        /// HTTP status code to respond with.
        status: StatusCode,
        /// Human-readable rejection message, served as the response body.
        message: String,
        /// Optional authentication challenge, surfaced via the
        /// `WWW-Authenticate` response header.
        challenge: Option<String>,
    },

    /// A step failed unexpectedly. Propagates untranslated to the router's
    /// error path.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Failure {
    /// Creates a validation failure.
    #[must_use]
    pub fn validation(status: StatusCode, errors: Value) -> Self {
        Self::Validation { status, errors }
    }

    /// Creates a security failure.
    #[must_use]
    pub fn security(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Security {
            status,
            message: message.into(),
            challenge: None,
        }
    }

    /// Returns the HTTP status code this failure maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { status, .. } | Self::Security { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationRejection> for Failure {
    fn from(rejection: ValidationRejection) -> Self {
        Self::Validation {
            status: rejection.status,
            errors: rejection.errors,
        }
    }
}

impl From<SecurityRejection> for Failure {
    fn from(rejection: SecurityRejection) -> Self {
        Self::Security {
            status: rejection.status,
            message: rejection.message,
            challenge: rejection.challenge,
        }
    }
}
