//! The pipeline step contract.
//!
//! A [`Step`] is one unit in the ordered per-operation processing chain. It
//! receives the mutable request state, the request, and a [`Next`]
//! continuation; it either advances the chain or short-circuits by raising a
//! [`Failure`](crate::error::Failure) or returning a response of its own.
//!
//! # Example
//!
//! ```ignore
//! use daedalus_core::step::{BoxFuture, Next, Step, StepOutcome};
//! use daedalus_core::context::RequestState;
//! use daedalus_core::types::Request;
//!
//! struct Stamp;
//!
//! impl Step for Stamp {
//!     fn name(&self) -> &'static str {
//!         "stamp"
//!     }
//!
//!     fn apply<'a>(
//!         &'a self,
//!         state: &'a mut RequestState,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, StepOutcome> {
//!         Box::pin(async move {
//!             state.set_extension("stamped");
//!             next.run(state, request).await
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::context::RequestState;
use crate::error::Failure;
use crate::handler::OperationHandler;
use crate::types::{Request, Response};

/// A boxed future, the return type of step and handler invocations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The outcome of running a step or a whole pipeline: a response, or a
/// terminal failure that aborts the remaining chain.
pub type StepOutcome = Result<Response, Failure>;

/// One unit in the ordered per-operation processing chain.
///
/// # Invariants
///
/// - A step MUST call `next.run()` at most once.
/// - A step that does not advance MUST return a response or a failure.
/// - Steps run strictly sequentially; a step completes (or fails) before the
///   next one begins.
pub trait Step: Send + Sync + 'static {
    /// Returns the name of this step, used for ordering assertions and logs.
    fn name(&self) -> &'static str;

    /// Processes the request, advancing the chain via `next`.
    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome>;
}

/// The advance-to-next-step continuation handed to each step.
///
/// Consuming `run` ensures a step can advance the chain at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More steps to process.
    Chain {
        step: &'a dyn Step,
        next: Box<Next<'a>>,
    },
    /// End of chain: invoke the terminal operation handler.
    Terminal(&'a dyn OperationHandler),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given step.
    #[must_use]
    pub fn new(step: &'a dyn Step, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                step,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the operation handler.
    #[must_use]
    pub fn terminal(handler: &'a dyn OperationHandler) -> Self {
        Self {
            inner: NextInner::Terminal(handler),
        }
    }

    /// Invokes the next step or the terminal handler.
    ///
    /// Consumes `self` so the chain can only be advanced once.
    pub async fn run(self, state: &mut RequestState, request: Request) -> StepOutcome {
        match self.inner {
            NextInner::Chain { step, next } => step.apply(state, request, *next).await,
            NextInner::Terminal(handler) => handler.handle(state, request).await,
        }
    }
}

/// A step built from a synchronous function over the request state.
///
/// Convenient for steps that only mutate state and never suspend, such as
/// test probes or simple body parsers.
pub struct FnStep<F> {
    name: &'static str,
    func: F,
}

impl<F> FnStep<F>
where
    F: Fn(&mut RequestState) -> Result<(), Failure> + Send + Sync + 'static,
{
    /// Creates a new function-based step.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Step for FnStep<F>
where
    F: Fn(&mut RequestState) -> Result<(), Failure> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            (self.func)(state)?;
            next.run(state, request).await
        })
    }
}
