//! The route registrar.
//!
//! [`Binder::bind`] walks an API description once and performs exactly these
//! side effects on the router:
//!
//! - per API root, the document route (when exposure is enabled) and the
//!   configured error renderer; the document route is registered before any
//!   of the root's operation routes;
//! - per documented operation, one composite route: the path template is
//!   translated to the router's syntax, the step chain is assembled from the
//!   operation's features, and the resulting pipeline is registered under
//!   the operation's method and computed path.
//!
//! Operations without a document are skipped. A duplicate method + path
//! registration is skipped with a warning, preserving the exactly-once
//! route invariant.

use std::sync::Arc;

use http::Method;

use daedalus_core::descriptor::{ApiRoot, OperationDescriptor};
use daedalus_pipeline::Pipeline;
use daedalus_router::Router;

use crate::config::BindConfig;
use crate::docs::DocsRoute;
use crate::error::BindError;
use crate::paths::translate;

/// Binds API descriptions to a router.
///
/// # Example
///
/// ```ignore
/// let binder = Binder::new(BindConfig::default());
/// let mut router = Router::new();
/// binder.bind(&mut router, &roots)?;
/// ```
#[derive(Debug, Default)]
pub struct Binder {
    config: BindConfig,
}

impl Binder {
    /// Creates a binder with the given configuration.
    #[must_use]
    pub fn new(config: BindConfig) -> Self {
        Self { config }
    }

    /// Returns the binder's configuration.
    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Registers every root of the description against the router.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] on the first configuration mistake; the
    /// router may have been partially populated at that point and should be
    /// discarded.
    pub fn bind(&self, router: &mut Router, roots: &[ApiRoot]) -> Result<(), BindError> {
        for root in roots {
            self.bind_root(router, root)?;
        }
        Ok(())
    }

    fn bind_root(&self, router: &mut Router, root: &ApiRoot) -> Result<(), BindError> {
        validate_base_path(root.base_path())?;

        // The document route must exist before any operation route of this
        // root and must not depend on pipeline steps.
        if self.config.expose_api_docs() {
            self.register_docs_route(router, root)?;
        }

        if let Some(renderer) = self.config.error_renderer() {
            router.add_error_renderer(root.base_path(), Arc::clone(renderer));
        }

        for descriptor in root.operations() {
            self.bind_operation(router, descriptor)?;
        }

        Ok(())
    }

    fn register_docs_route(&self, router: &mut Router, root: &ApiRoot) -> Result<(), BindError> {
        let docs_path = self.config.docs_path();
        if !docs_path.starts_with('/') {
            return Err(BindError::InvalidDocsPath(docs_path.to_string()));
        }

        let path = format!("{}{}", root.base_path(), docs_path);
        if router.has_route(&Method::GET, &path) {
            tracing::warn!(%path, "document route already registered; skipping");
            return Ok(());
        }

        let route = DocsRoute::new(
            Arc::clone(root.document()),
            root.base_path(),
            self.config.access_filter(),
        );
        router.add_route(Method::GET, &path, Arc::new(route));
        tracing::debug!(%path, "registered document route");

        Ok(())
    }

    fn bind_operation(
        &self,
        router: &mut Router,
        descriptor: &OperationDescriptor,
    ) -> Result<(), BindError> {
        validate_base_path(descriptor.base_path())?;

        let documented = descriptor
            .operation_document()
            .is_some_and(|document| !document.is_null());
        if !documented {
            tracing::debug!(
                method = %descriptor.method(),
                template = %descriptor.path_template(),
                "operation has no document; skipping"
            );
            return Ok(());
        }

        let path = format!(
            "{}{}",
            descriptor.base_path(),
            translate(descriptor.path_template())
        );

        if router.has_route(descriptor.method(), &path) {
            tracing::warn!(
                method = %descriptor.method(),
                %path,
                "duplicate route registration; skipping"
            );
            return Ok(());
        }

        let pipeline = Pipeline::assemble(descriptor, self.config.consumes_steps());
        tracing::debug!(
            method = %descriptor.method(),
            %path,
            steps = pipeline.step_count(),
            "registered operation route"
        );
        router.add_route(descriptor.method().clone(), &path, Arc::new(pipeline));

        Ok(())
    }
}

fn validate_base_path(base_path: &str) -> Result<(), BindError> {
    if base_path.is_empty() || base_path.starts_with('/') {
        Ok(())
    } else {
        Err(BindError::InvalidBasePath(base_path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::handler::{FnHandler, OperationHandler};
    use daedalus_core::types::{Response, ResponseExt};
    use http::StatusCode;
    use serde_json::json;

    fn noop_handler() -> Arc<dyn OperationHandler> {
        Arc::new(FnHandler::new(|_state, _request| {
            Box::pin(async { Ok(Response::error(StatusCode::OK, "ok")) })
        }))
    }

    fn documented(method: Method, template: &str) -> OperationDescriptor {
        OperationDescriptor::builder(method, template, noop_handler())
            .base_path("/v2")
            .operation_document(Arc::new(json!({"operationId": "op"})))
            .build()
    }

    fn pets_root() -> ApiRoot {
        ApiRoot::new("/v2", Arc::new(json!({"swagger": "2.0"})))
            .with_operation(documented(Method::GET, "/pets/{petId}"))
            .with_operation(documented(Method::POST, "/pets"))
    }

    #[test]
    fn test_bind_registers_docs_and_operations() {
        let binder = Binder::new(BindConfig::default());
        let mut router = Router::new();
        binder.bind(&mut router, &[pets_root()]).unwrap();

        assert_eq!(router.route_count(), 3);
        assert!(router.has_route(&Method::GET, "/v2/api-docs"));
        assert!(router.has_route(&Method::GET, "/v2/pets/:petId"));
        assert!(router.has_route(&Method::POST, "/v2/pets"));
    }

    #[test]
    fn test_docs_route_disabled() {
        let binder = Binder::new(BindConfig::builder().expose_api_docs(false).build());
        let mut router = Router::new();
        binder.bind(&mut router, &[pets_root()]).unwrap();

        assert!(!router.has_route(&Method::GET, "/v2/api-docs"));
        assert_eq!(router.route_count(), 2);
    }

    #[test]
    fn test_undocumented_operation_skipped() {
        let root = ApiRoot::new("/v2", Arc::new(json!({}))).with_operation(
            OperationDescriptor::builder(Method::GET, "/pets", noop_handler())
                .base_path("/v2")
                .build(),
        );

        let binder = Binder::new(BindConfig::builder().expose_api_docs(false).build());
        let mut router = Router::new();
        binder.bind(&mut router, &[root]).unwrap();

        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_null_operation_document_skipped() {
        let root = ApiRoot::new("/v2", Arc::new(json!({}))).with_operation(
            OperationDescriptor::builder(Method::GET, "/pets", noop_handler())
                .base_path("/v2")
                .operation_document(Arc::new(serde_json::Value::Null))
                .build(),
        );

        let binder = Binder::new(BindConfig::builder().expose_api_docs(false).build());
        let mut router = Router::new();
        binder.bind(&mut router, &[root]).unwrap();

        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_duplicate_operation_registered_once() {
        let root = ApiRoot::new("/v2", Arc::new(json!({})))
            .with_operation(documented(Method::GET, "/pets/{petId}"))
            .with_operation(documented(Method::GET, "/pets/{petId}"));

        let binder = Binder::new(BindConfig::builder().expose_api_docs(false).build());
        let mut router = Router::new();
        binder.bind(&mut router, &[root]).unwrap();

        assert_eq!(router.route_count(), 1);
    }

    #[test]
    fn test_invalid_base_path_rejected() {
        let root = ApiRoot::new("v2", Arc::new(json!({})));
        let binder = Binder::new(BindConfig::default());
        let mut router = Router::new();

        let result = binder.bind(&mut router, &[root]);
        assert!(matches!(result, Err(BindError::InvalidBasePath(_))));
    }

    #[test]
    fn test_invalid_docs_path_rejected() {
        let binder = Binder::new(BindConfig::builder().docs_path("api-docs").build());
        let mut router = Router::new();

        let result = binder.bind(&mut router, &[pets_root()]);
        assert!(matches!(result, Err(BindError::InvalidDocsPath(_))));
    }

    #[test]
    fn test_empty_base_path_allowed() {
        let root = ApiRoot::new("", Arc::new(json!({}))).with_operation(
            OperationDescriptor::builder(Method::GET, "/pets", noop_handler())
                .operation_document(Arc::new(json!({"operationId": "listPets"})))
                .build(),
        );

        let binder = Binder::new(BindConfig::default());
        let mut router = Router::new();
        binder.bind(&mut router, &[root]).unwrap();

        assert!(router.has_route(&Method::GET, "/api-docs"));
        assert!(router.has_route(&Method::GET, "/pets"));
    }
}
