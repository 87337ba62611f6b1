//! Request-validation stage.
//!
//! Validates the incoming request eagerly against the operation's declared
//! schema. A rejection becomes a terminal failure carrying the validator's
//! status code and structured payload verbatim, aborting the pipeline before
//! coercion, defaults, security, and the terminal handler.

use std::sync::Arc;

use daedalus_core::context::RequestState;
use daedalus_core::error::Failure;
use daedalus_core::features::RequestValidator;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Runs the operation's request validator.
pub struct RequestValidationStep {
    validator: Arc<dyn RequestValidator>,
}

impl RequestValidationStep {
    /// Creates the step from the operation's request validator.
    #[must_use]
    pub fn new(validator: Arc<dyn RequestValidator>) -> Self {
        Self { validator }
    }
}

impl Step for RequestValidationStep {
    fn name(&self) -> &'static str {
        "request_validation"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            self.validator
                .validate(state, &request)
                .map_err(Failure::from)?;
            next.run(state, request).await
        })
    }
}
