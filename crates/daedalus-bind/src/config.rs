//! Binder configuration.
//!
//! [`BindConfig`] carries everything the registrar needs besides the API
//! description itself: the document-exposure switch and path, the ordered
//! media-type middleware registry, the optional error renderer, and the
//! access filter that writes the document route's response.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use daedalus_core::context::RequestState;
use daedalus_core::step::Step;
use daedalus_core::types::{Response, ResponseExt};
use daedalus_pipeline::ConsumesRegistry;
use daedalus_router::ErrorRenderer;

/// Default path of the document route, relative to each root's base path.
pub const DEFAULT_DOCS_PATH: &str = "/api-docs";

/// Writes the response of the document route.
///
/// Receives the request state and the (already patched) API document.
pub type AccessFilter = Arc<dyn Fn(&RequestState, &Value) -> Response + Send + Sync>;

/// The default access filter: respond `200` with the document as JSON body.
#[must_use]
pub fn default_access_filter(_state: &RequestState, document: &Value) -> Response {
    Response::json(StatusCode::OK, document)
}

/// Configuration consumed by the [`Binder`](crate::Binder).
#[derive(Clone)]
pub struct BindConfig {
    /// Whether to register the document route per API root.
    expose_api_docs: bool,

    /// Path of the document route, relative to each base path.
    docs_path: String,

    /// Ordered media-type middleware registry.
    consumes_steps: ConsumesRegistry,

    /// Error renderer registered per API root, if any.
    error_renderer: Option<Arc<dyn ErrorRenderer>>,

    /// Access filter for the document route.
    access_filter: AccessFilter,
}

impl BindConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> BindConfigBuilder {
        BindConfigBuilder::new()
    }

    /// Returns whether the document route is registered.
    #[must_use]
    pub fn expose_api_docs(&self) -> bool {
        self.expose_api_docs
    }

    /// Returns the document route path.
    #[must_use]
    pub fn docs_path(&self) -> &str {
        &self.docs_path
    }

    /// Returns the media-type middleware registry.
    #[must_use]
    pub fn consumes_steps(&self) -> &ConsumesRegistry {
        &self.consumes_steps
    }

    /// Returns the configured error renderer, if any.
    #[must_use]
    pub fn error_renderer(&self) -> Option<&Arc<dyn ErrorRenderer>> {
        self.error_renderer.as_ref()
    }

    /// Returns a handle to the access filter.
    #[must_use]
    pub fn access_filter(&self) -> AccessFilter {
        Arc::clone(&self.access_filter)
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for BindConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindConfig")
            .field("expose_api_docs", &self.expose_api_docs)
            .field("docs_path", &self.docs_path)
            .field(
                "consumes_steps",
                &self.consumes_steps.keys().collect::<Vec<_>>(),
            )
            .field("error_renderer", &self.error_renderer.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`BindConfig`].
pub struct BindConfigBuilder {
    expose_api_docs: bool,
    docs_path: String,
    consumes_steps: ConsumesRegistry,
    error_renderer: Option<Arc<dyn ErrorRenderer>>,
    access_filter: AccessFilter,
}

impl BindConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expose_api_docs: true,
            docs_path: DEFAULT_DOCS_PATH.to_string(),
            consumes_steps: ConsumesRegistry::new(),
            error_renderer: None,
            access_filter: Arc::new(default_access_filter),
        }
    }

    /// Enables or disables the document route.
    #[must_use]
    pub fn expose_api_docs(mut self, expose: bool) -> Self {
        self.expose_api_docs = expose;
        self
    }

    /// Sets the document route path (must begin with `/`).
    #[must_use]
    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = path.into();
        self
    }

    /// Registers a middleware step for a media type.
    ///
    /// An operation declaring the media type in its `consumes` list gets the
    /// step inserted after the defaults step and before security, in the
    /// operation's declared order.
    #[must_use]
    pub fn consumes_step(mut self, media_type: impl Into<String>, step: Arc<dyn Step>) -> Self {
        self.consumes_steps.insert(media_type.into(), step);
        self
    }

    /// Sets the error renderer registered for each API root.
    #[must_use]
    pub fn error_renderer(mut self, renderer: Arc<dyn ErrorRenderer>) -> Self {
        self.error_renderer = Some(renderer);
        self
    }

    /// Replaces the document route's access filter.
    #[must_use]
    pub fn access_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RequestState, &Value) -> Response + Send + Sync + 'static,
    {
        self.access_filter = Arc::new(filter);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> BindConfig {
        BindConfig {
            expose_api_docs: self.expose_api_docs,
            docs_path: self.docs_path,
            consumes_steps: self.consumes_steps,
            error_renderer: self.error_renderer,
            access_filter: self.access_filter,
        }
    }
}

impl Default for BindConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
