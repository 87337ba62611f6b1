//! Pipeline assembly and execution.
//!
//! [`Pipeline::assemble`] is the feature-middleware builder: given an
//! [`OperationDescriptor`] it produces the ordered step sequence described
//! in the module docs of [`crate::stages`]. The pipeline itself is the
//! executor: it implements [`RouteHandler`], running its steps strictly
//! sequentially and aborting the remainder of the chain when a step raises
//! a terminal failure.
//!
//! A pipeline is built once per operation at registration time and invoked
//! once per incoming request; it is never mutated after construction and is
//! reentrant across concurrent requests.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use daedalus_core::context::RequestState;
use daedalus_core::descriptor::OperationDescriptor;
use daedalus_core::handler::{OperationHandler, RouteHandler};
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

use crate::stages::{
    CoercionStep, DefaultsStep, DocumentsStep, RequestValidationStep, ResponseCheckStep,
    SecurityStep,
};

/// An ordered registry mapping media types to externally supplied steps.
///
/// Iteration order of the operation's `consumes` list, not of this registry,
/// decides the order in which matched steps run.
pub type ConsumesRegistry = IndexMap<String, Arc<dyn Step>>;

/// The compiled processing chain for one operation.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::assemble(&descriptor, &consumes_registry);
/// router.add_route(method, path, Arc::new(pipeline));
/// ```
pub struct Pipeline {
    /// Ordered steps, run before the terminal handler.
    steps: Vec<Arc<dyn Step>>,

    /// The terminal operation handler, always last, always present.
    handler: Arc<dyn OperationHandler>,
}

impl Pipeline {
    /// Assembles the step sequence for one operation.
    ///
    /// The order is fixed: additional pre-built steps first, then (when
    /// `features_enabled` and an operation document exists) document
    /// attachment, response-check installation, request validation,
    /// coercion, defaults, consumes middleware in declared order, and
    /// security. Absent features contribute no step.
    #[must_use]
    pub fn assemble(descriptor: &OperationDescriptor, consumes: &ConsumesRegistry) -> Self {
        let mut steps: Vec<Arc<dyn Step>> = Vec::new();

        for step in descriptor.additional_steps() {
            steps.push(Arc::clone(step));
        }

        // Feature steps are compiled only for documented operations that
        // opted in; otherwise the chain is additional steps + handler.
        if descriptor.features_enabled() {
            if let Some(operation_document) = descriptor.operation_document() {
                steps.push(Arc::new(DocumentsStep::new(
                    Arc::clone(descriptor.api_document()),
                    Arc::clone(operation_document),
                )));

                let features = descriptor.features();

                if let Some(validator) = features.response_validator() {
                    steps.push(Arc::new(ResponseCheckStep::new(Arc::clone(validator))));
                }

                if let Some(validator) = features.request_validator() {
                    steps.push(Arc::new(RequestValidationStep::new(Arc::clone(validator))));
                }

                if let Some(coercer) = features.coercer() {
                    steps.push(Arc::new(CoercionStep::new(Arc::clone(coercer))));
                }

                if let Some(setter) = features.default_setter() {
                    steps.push(Arc::new(DefaultsStep::new(Arc::clone(setter))));
                }

                for media_type in descriptor.consumes() {
                    if let Some(step) = consumes.get(media_type) {
                        steps.push(Arc::clone(step));
                    }
                }

                if let Some(handler) = features.security_handler() {
                    steps.push(Arc::new(SecurityStep::new(Arc::clone(handler))));
                }
            }
        }

        Self {
            steps,
            handler: Arc::clone(descriptor.handler()),
        }
    }

    /// Creates a pipeline from explicit parts.
    ///
    /// Mainly useful for routes that bypass feature assembly.
    #[must_use]
    pub fn from_parts(steps: Vec<Arc<dyn Step>>, handler: Arc<dyn OperationHandler>) -> Self {
        Self { steps, handler }
    }

    /// Returns the names of the steps in execution order.
    ///
    /// The terminal handler is not a step and is not listed.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of steps (excluding the terminal handler).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Runs the pipeline for one request.
    pub async fn run(&self, state: &mut RequestState, request: Request) -> StepOutcome {
        self.build_chain().run(state, request).await
    }

    /// Builds the continuation chain, back to front.
    fn build_chain(&self) -> Next<'_> {
        let mut next = Next::terminal(self.handler.as_ref());

        for step in self.steps.iter().rev() {
            next = Next::new(step.as_ref(), next);
        }

        next
    }
}

impl RouteHandler for Pipeline {
    fn call<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(self.run(state, request))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish_non_exhaustive()
    }
}
