//! Response-check installation stage.
//!
//! Unlike request validation this stage validates nothing eagerly: it equips
//! the request state with a capability the terminal handler may invoke
//! against its candidate response before writing it.

use std::sync::Arc;

use daedalus_core::context::RequestState;
use daedalus_core::features::ResponseValidator;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Installs the operation's response-validation capability.
pub struct ResponseCheckStep {
    validator: Arc<dyn ResponseValidator>,
}

impl ResponseCheckStep {
    /// Creates the step from the operation's response validator.
    #[must_use]
    pub fn new(validator: Arc<dyn ResponseValidator>) -> Self {
        Self { validator }
    }
}

impl Step for ResponseCheckStep {
    fn name(&self) -> &'static str {
        "response_check"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            state.install_response_check(Arc::clone(&self.validator));
            next.run(state, request).await
        })
    }
}
