//! Default-application stage.
//!
//! Fills in declared default values for absent optional fields. Runs after
//! validation and coercion.

use std::sync::Arc;

use daedalus_core::context::RequestState;
use daedalus_core::features::DefaultSetter;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Runs the operation's default setter.
pub struct DefaultsStep {
    setter: Arc<dyn DefaultSetter>,
}

impl DefaultsStep {
    /// Creates the step from the operation's default setter.
    #[must_use]
    pub fn new(setter: Arc<dyn DefaultSetter>) -> Self {
        Self { setter }
    }
}

impl Step for DefaultsStep {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            self.setter.apply(state);
            next.run(state, request).await
        })
    }
}
