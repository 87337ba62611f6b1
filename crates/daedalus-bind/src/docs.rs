//! The document exposure route.
//!
//! One route per API root serving the compiled API document. The handler is
//! a plain [`RouteHandler`] with no pipeline: it must not depend on any
//! operation's steps having run.
//!
//! Legacy-format documents (those carrying a `"swagger"` key) declare their
//! own `host` and `basePath`; both are patched from the live request before
//! serving so the document stays accurate behind proxies and rebinds.

use std::sync::Arc;

use http::header;
use serde_json::Value;

use daedalus_core::context::RequestState;
use daedalus_core::handler::RouteHandler;
use daedalus_core::step::{BoxFuture, StepOutcome};
use daedalus_core::types::Request;

use crate::config::AccessFilter;

/// Serves the compiled API document for one root.
pub struct DocsRoute {
    /// The compiled API document.
    document: Arc<Value>,

    /// The root's base path, patched into legacy documents.
    base_path: String,

    /// Writes the final response.
    filter: AccessFilter,
}

impl DocsRoute {
    /// Creates the route handler for one API root.
    #[must_use]
    pub fn new(document: Arc<Value>, base_path: impl Into<String>, filter: AccessFilter) -> Self {
        Self {
            document,
            base_path: base_path.into(),
            filter,
        }
    }
}

impl RouteHandler for DocsRoute {
    fn call<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
    ) -> BoxFuture<'a, StepOutcome> {
        Box::pin(async move {
            let host = request
                .headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);

            let document = patch_legacy_document(&self.document, host.as_deref(), &self.base_path);
            Ok((self.filter)(state, &document))
        })
    }
}

/// Patches `host` and `basePath` into a legacy-format document.
///
/// Documents without a `"swagger"` key describe their servers themselves and
/// are returned unchanged.
fn patch_legacy_document(document: &Value, host: Option<&str>, base_path: &str) -> Value {
    let mut patched = document.clone();

    if patched.get("swagger").is_some() {
        if let Some(object) = patched.as_object_mut() {
            if let Some(host) = host {
                object.insert("host".to_string(), Value::String(host.to_string()));
            }
            let base_path = if base_path.is_empty() { "/" } else { base_path };
            object.insert("basePath".to_string(), Value::String(base_path.to_string()));
        }
    }

    patched
}
