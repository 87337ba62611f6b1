//! Document-attachment stage.
//!
//! Always the first feature step of a pipeline: it places the API document
//! and the operation document on the request state so downstream steps and
//! the terminal handler can read the contract.

use std::sync::Arc;

use serde_json::Value;

use daedalus_core::context::RequestState;
use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
use daedalus_core::types::Request;

/// Attaches the API and operation documents to the request state.
pub struct DocumentsStep {
    /// The full API document, shared across the root's operations.
    api: Arc<Value>,
    /// This operation's document fragment.
    operation: Arc<Value>,
}

impl DocumentsStep {
    /// Creates the step for one operation.
    #[must_use]
    pub fn new(api: Arc<Value>, operation: Arc<Value>) -> Self {
        Self { api, operation }
    }
}

impl Step for DocumentsStep {
    fn name(&self) -> &'static str {
        "attach_documents"
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            state.attach_documents(Arc::clone(&self.api), Arc::clone(&self.operation));
            next.run(state, request).await
        })
    }
}
