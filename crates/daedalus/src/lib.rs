//! # Daedalus
//!
//! Daedalus binds a declarative API description to an HTTP router: for each
//! declared operation it compiles the operation's validation, coercion,
//! default-value, and security capabilities into one ordered step pipeline
//! and registers the composite handler as a single route.
//!
//! ## Crates
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | [`daedalus-core`](daedalus_core) | Shared types, contracts, and the per-request state |
//! | [`daedalus-pipeline`](daedalus_pipeline) | Step assembly and sequential execution |
//! | [`daedalus-router`](daedalus_router) | The router collaborator and per-request dispatch |
//! | [`daedalus-bind`](daedalus_bind) | Path translation, route registration, document exposure |
//! | [`daedalus-server`](daedalus_server) | Hyper/Tokio HTTP server |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use daedalus::{
//!     ApiRoot, BindConfig, Binder, FeatureSet, FnHandler, OperationDescriptor, Response,
//!     ResponseExt, Router, Server,
//! };
//! use http::{Method, StatusCode};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = Arc::new(FnHandler::new(|state, _request| {
//!     let pet_id = state.path_param("petId").cloned();
//!     Box::pin(async move {
//!         Ok(Response::json(StatusCode::OK, &serde_json::json!({ "id": pet_id })))
//!     })
//! }));
//!
//! let operation = OperationDescriptor::builder(Method::GET, "/pets/{petId}", handler)
//!     .base_path("/v2")
//!     .api_document(Arc::new(api_document.clone()))
//!     .operation_document(Arc::new(operation_document))
//!     .features(FeatureSet::new())
//!     .build();
//!
//! let root = ApiRoot::new("/v2", Arc::new(api_document)).with_operation(operation);
//!
//! let mut router = Router::new();
//! Binder::new(BindConfig::default()).bind(&mut router, &[root])?;
//!
//! Server::builder()
//!     .http_addr("0.0.0.0:8080")
//!     .router(router)
//!     .build()
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use daedalus_bind::{
    default_access_filter, AccessFilter, BindConfig, BindConfigBuilder, BindError, Binder,
    DocsRoute, DEFAULT_DOCS_PATH,
};
pub use daedalus_core::{
    ApiRoot, BoxFuture, Coercer, DefaultSetter, Failure, FeatureSet, FnHandler, FnStep, Next,
    OperationDescriptor, OperationDescriptorBuilder, OperationHandler, Request, RequestId,
    RequestState, RequestValidator, Response, ResponseExt, ResponseValidator, RouteHandler,
    SecurityHandler, SecurityRejection, Step, StepOutcome, ValidationRejection,
};
pub use daedalus_pipeline::{ConsumesRegistry, Pipeline};
pub use daedalus_router::{not_found, render_failure, ErrorRenderer, RouteMatch, Router};
pub use daedalus_server::{
    Server, ServerBuilder, ServerConfig, ServerConfigBuilder, ServerError, ShutdownSignal,
};

/// Translates a brace-syntax path template to the router's colon syntax.
pub use daedalus_bind::translate;
