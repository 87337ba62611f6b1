//! # Daedalus Core
//!
//! Core types and traits for the Daedalus contract-binding framework.
//!
//! This crate provides the foundational pieces shared by the pipeline
//! compiler, the router, and the registrar:
//!
//! - [`RequestState`] - Per-request state carrying parameters, documents,
//!   and capabilities
//! - [`Step`] / [`Next`] - The ordered processing-chain contract
//! - [`OperationHandler`] / [`RouteHandler`] - Terminal and composite
//!   handler seams
//! - [`FeatureSet`] - Optional per-operation capabilities
//! - [`OperationDescriptor`] / [`ApiRoot`] - Declared operations and roots
//! - [`Failure`] - Terminal failures raised by steps

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod descriptor;
pub mod error;
pub mod features;
pub mod handler;
pub mod step;
pub mod types;

// Re-export main types at crate root
pub use context::{RequestId, RequestState};
pub use descriptor::{ApiRoot, OperationDescriptor, OperationDescriptorBuilder};
pub use error::Failure;
pub use features::{
    Coercer, DefaultSetter, FeatureSet, RequestValidator, ResponseValidator, SecurityHandler,
    SecurityRejection, ValidationRejection,
};
pub use handler::{FnHandler, OperationHandler, RouteHandler};
pub use step::{BoxFuture, FnStep, Next, Step, StepOutcome};
pub use types::{Request, Response, ResponseExt};
