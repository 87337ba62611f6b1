//! Handler contracts.
//!
//! Two seams are defined here:
//!
//! - [`OperationHandler`]: the terminal request-processing function supplied
//!   externally for each operation. It is always the last element of a
//!   compiled pipeline.
//! - [`RouteHandler`]: the router's native handler signature. A compiled
//!   pipeline is registered with the router as a single `RouteHandler`.

use crate::context::RequestState;
use crate::step::{BoxFuture, StepOutcome};
use crate::types::Request;

/// The terminal request-processing function for one operation.
pub trait OperationHandler: Send + Sync + 'static {
    /// Produces the response for the request.
    ///
    /// Runs only after every step in the pipeline has advanced; a failure in
    /// any earlier step means this is never invoked.
    fn handle<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
    ) -> BoxFuture<'a, StepOutcome>;
}

/// The router's native handler signature.
///
/// The router invokes exactly one `RouteHandler` per matched request,
/// passing the freshly created per-request state.
pub trait RouteHandler: Send + Sync + 'static {
    /// Handles one request.
    fn call<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
    ) -> BoxFuture<'a, StepOutcome>;
}

/// An [`OperationHandler`] built from a function.
///
/// The function may read and mutate the state synchronously, then return an
/// owned future producing the outcome.
///
/// # Example
///
/// ```
/// use daedalus_core::handler::FnHandler;
/// use daedalus_core::types::{Response, ResponseExt};
/// use http::StatusCode;
///
/// let handler = FnHandler::new(|_state, _request| {
///     Box::pin(async { Ok(Response::json(StatusCode::OK, &serde_json::json!({"ok": true}))) })
/// });
/// # let _ = handler;
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&mut RequestState, Request) -> BoxFuture<'static, StepOutcome> + Send + Sync + 'static,
{
    /// Creates a new function-based handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> OperationHandler for FnHandler<F>
where
    F: Fn(&mut RequestState, Request) -> BoxFuture<'static, StepOutcome> + Send + Sync + 'static,
{
    fn handle<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
    ) -> BoxFuture<'a, StepOutcome> {
        (self.func)(state, request)
    }
}
