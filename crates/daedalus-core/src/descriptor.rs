//! Operation descriptors.
//!
//! An [`OperationDescriptor`] is the unit of input to the route registrar:
//! one HTTP method + path template with its documents, terminal handler,
//! declared features, and media types. Descriptors are built once when the
//! API description is compiled, are immutable thereafter, and are discarded
//! after registration; only the compiled pipeline persists.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::features::FeatureSet;
use crate::handler::OperationHandler;
use crate::step::Step;

/// One declared operation: method, path template, documents, handler, and
/// optional features.
pub struct OperationDescriptor {
    /// HTTP method for this operation.
    method: Method,

    /// Path template with `{name}`-style parameter placeholders.
    path_template: String,

    /// Base path prefix the operation is mounted under.
    base_path: String,

    /// The full API document, shared across all operations of one API root.
    api_document: Arc<Value>,

    /// This operation's own document fragment.
    operation_document: Option<Arc<Value>>,

    /// The terminal request-processing function.
    handler: Arc<dyn OperationHandler>,

    /// Whether feature steps are compiled into the pipeline at all.
    features_enabled: bool,

    /// The optional per-operation capabilities.
    features: FeatureSet,

    /// Declared media types, in order of preference.
    consumes: Vec<String>,

    /// Opaque pre-built steps, inserted at the very front of the chain.
    additional_steps: Vec<Arc<dyn Step>>,
}

impl OperationDescriptor {
    /// Starts building a descriptor for a method, path template, and handler.
    #[must_use]
    pub fn builder(
        method: Method,
        path_template: impl Into<String>,
        handler: Arc<dyn OperationHandler>,
    ) -> OperationDescriptorBuilder {
        OperationDescriptorBuilder {
            method,
            path_template: path_template.into(),
            base_path: String::new(),
            api_document: Arc::new(Value::Null),
            operation_document: None,
            handler,
            features_enabled: true,
            features: FeatureSet::default(),
            consumes: Vec::new(),
            additional_steps: Vec::new(),
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Returns the base path prefix.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the API document.
    #[must_use]
    pub fn api_document(&self) -> &Arc<Value> {
        &self.api_document
    }

    /// Returns the operation document, if one exists.
    #[must_use]
    pub fn operation_document(&self) -> Option<&Arc<Value>> {
        self.operation_document.as_ref()
    }

    /// Returns the terminal handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn OperationHandler> {
        &self.handler
    }

    /// Returns whether feature steps are enabled.
    #[must_use]
    pub fn features_enabled(&self) -> bool {
        self.features_enabled
    }

    /// Returns the declared features.
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Returns the declared media types.
    #[must_use]
    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    /// Returns the opaque pre-built steps.
    #[must_use]
    pub fn additional_steps(&self) -> &[Arc<dyn Step>] {
        &self.additional_steps
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("method", &self.method)
            .field("path_template", &self.path_template)
            .field("base_path", &self.base_path)
            .field("has_operation_document", &self.operation_document.is_some())
            .field("features_enabled", &self.features_enabled)
            .field("features", &self.features)
            .field("consumes", &self.consumes)
            .field("additional_steps", &self.additional_steps.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`OperationDescriptor`].
pub struct OperationDescriptorBuilder {
    method: Method,
    path_template: String,
    base_path: String,
    api_document: Arc<Value>,
    operation_document: Option<Arc<Value>>,
    handler: Arc<dyn OperationHandler>,
    features_enabled: bool,
    features: FeatureSet,
    consumes: Vec<String>,
    additional_steps: Vec<Arc<dyn Step>>,
}

impl OperationDescriptorBuilder {
    /// Sets the base path prefix.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Sets the shared API document.
    #[must_use]
    pub fn api_document(mut self, document: Arc<Value>) -> Self {
        self.api_document = document;
        self
    }

    /// Sets the operation document.
    #[must_use]
    pub fn operation_document(mut self, document: Arc<Value>) -> Self {
        self.operation_document = Some(document);
        self
    }

    /// Enables or disables feature steps for this operation.
    #[must_use]
    pub fn features_enabled(mut self, enabled: bool) -> Self {
        self.features_enabled = enabled;
        self
    }

    /// Sets the feature set.
    #[must_use]
    pub fn features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Declares a consumed media type. Order is significant.
    #[must_use]
    pub fn consume(mut self, media_type: impl Into<String>) -> Self {
        self.consumes.push(media_type.into());
        self
    }

    /// Declares consumed media types, preserving the given order.
    #[must_use]
    pub fn consumes<I>(mut self, media_types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.consumes.extend(media_types.into_iter().map(Into::into));
        self
    }

    /// Adds an opaque pre-built step, run before all feature steps.
    #[must_use]
    pub fn additional_step(mut self, step: Arc<dyn Step>) -> Self {
        self.additional_steps.push(step);
        self
    }

    /// Builds the descriptor.
    #[must_use]
    pub fn build(self) -> OperationDescriptor {
        OperationDescriptor {
            method: self.method,
            path_template: self.path_template,
            base_path: self.base_path,
            api_document: self.api_document,
            operation_document: self.operation_document,
            handler: self.handler,
            features_enabled: self.features_enabled,
            features: self.features,
            consumes: self.consumes,
            additional_steps: self.additional_steps,
        }
    }
}

/// One API root: a base path, its compiled document, and the operations
/// declared under it.
pub struct ApiRoot {
    base_path: String,
    document: Arc<Value>,
    operations: Vec<OperationDescriptor>,
}

impl ApiRoot {
    /// Creates a new API root.
    #[must_use]
    pub fn new(base_path: impl Into<String>, document: Arc<Value>) -> Self {
        Self {
            base_path: base_path.into(),
            document,
            operations: Vec::new(),
        }
    }

    /// Adds an operation to this root.
    #[must_use]
    pub fn with_operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    /// Adds an operation in place.
    pub fn push_operation(&mut self, operation: OperationDescriptor) {
        self.operations.push(operation);
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the compiled API document.
    #[must_use]
    pub fn document(&self) -> &Arc<Value> {
        &self.document
    }

    /// Returns the declared operations.
    #[must_use]
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }
}

impl fmt::Debug for ApiRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRoot")
            .field("base_path", &self.base_path)
            .field("operations", &self.operations.len())
            .finish_non_exhaustive()
    }
}
