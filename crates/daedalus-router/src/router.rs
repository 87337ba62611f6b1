//! Route table and path matching.
//!
//! The router maps incoming method + path pairs to registered handlers.
//! Its native parameter syntax is the leading-colon token:
//!
//! - `:name` captures one path segment (e.g. `/users/:userId`)
//! - `*name` captures the remaining segments (e.g. `/files/*path`)
//!
//! Routes are checked in registration order; the first match wins. Path
//! templates in other syntaxes (such as brace placeholders) must be
//! translated to this syntax before registration.

use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;

use daedalus_core::handler::RouteHandler;

use crate::dispatch::ErrorRenderer;

/// A segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// A literal segment (e.g. "users").
    Literal(String),

    /// A parameter segment (e.g. ":userId").
    Param(String),

    /// A trailing wildcard segment (e.g. "*path").
    Wildcard(String),
}

/// A registered route: pattern, method, and handler.
struct Route {
    /// HTTP method for this route.
    method: Method,

    /// Parsed pattern segments.
    segments: Vec<PathSegment>,

    /// Original pattern, kept for duplicate detection and logs.
    pattern: String,

    /// The handler invoked for matching requests.
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    fn new(method: Method, pattern: &str, handler: Arc<dyn RouteHandler>) -> Self {
        Self {
            method,
            segments: parse_segments(pattern),
            pattern: pattern.to_string(),
            handler,
        }
    }

    /// Attempts to match this route against a request path.
    ///
    /// Returns the extracted parameters (in path order) on a match.
    fn match_path(&self, path: &str) -> Option<IndexMap<String, String>> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = IndexMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Wildcard(name) => {
                    // Consumes everything that remains, including nothing.
                    let rest = actual.get(index..).unwrap_or(&[]).join("/");
                    params.insert(name.clone(), rest);
                    return Some(params);
                }
                PathSegment::Literal(expected) => {
                    if actual.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    let value = *actual.get(index)?;
                    params.insert(name.clone(), value.to_string());
                }
            }
        }

        if actual.len() != self.segments.len() {
            return None;
        }

        Some(params)
    }
}

/// Parses a colon-syntax pattern into segments.
fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if let Some(name) = s.strip_prefix(':') {
                PathSegment::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                PathSegment::Wildcard(name.to_string())
            } else {
                PathSegment::Literal(s.to_string())
            }
        })
        .collect()
}

/// A matched route: the handler to invoke and the extracted parameters.
pub struct RouteMatch<'r> {
    handler: &'r Arc<dyn RouteHandler>,
    params: IndexMap<String, String>,
}

impl<'r> RouteMatch<'r> {
    /// Returns the matched handler.
    #[must_use]
    pub fn handler(&self) -> &'r Arc<dyn RouteHandler> {
        self.handler
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Splits the match into its handler and owned parameters.
    #[must_use]
    pub fn into_parts(self) -> (&'r Arc<dyn RouteHandler>, IndexMap<String, String>) {
        (self.handler, self.params)
    }
}

/// HTTP request router.
///
/// # Example
///
/// ```ignore
/// let mut router = Router::new();
/// router.add_route(Method::GET, "/pets/:petId", handler);
///
/// let matched = router.match_route(&Method::GET, "/pets/42").unwrap();
/// assert_eq!(matched.params().get("petId").map(String::as_str), Some("42"));
/// ```
#[derive(Default)]
pub struct Router {
    /// Registered routes, checked in order.
    routes: Vec<Route>,

    /// Error renderers keyed by base-path prefix.
    error_renderers: Vec<(String, Arc<dyn ErrorRenderer>)>,
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a method and colon-syntax pattern.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl AsRef<str>,
        handler: Arc<dyn RouteHandler>,
    ) {
        self.routes
            .push(Route::new(method, pattern.as_ref(), handler));
    }

    /// Returns `true` if a route with the same method and pattern exists.
    #[must_use]
    pub fn has_route(&self, method: &Method, pattern: &str) -> bool {
        self.routes
            .iter()
            .any(|r| r.method == *method && r.pattern == pattern)
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Registers an error renderer for everything under a base path.
    ///
    /// At dispatch time the renderer with the longest matching prefix wins.
    pub fn add_error_renderer(
        &mut self,
        base_path: impl Into<String>,
        renderer: Arc<dyn ErrorRenderer>,
    ) {
        self.error_renderers.push((base_path.into(), renderer));
    }

    /// Matches an incoming request to a route.
    ///
    /// Routes are checked in registration order; the first match wins.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        for route in &self.routes {
            if route.method == *method {
                if let Some(params) = route.match_path(path) {
                    return Some(RouteMatch {
                        handler: &route.handler,
                        params,
                    });
                }
            }
        }

        None
    }

    /// Returns the error renderer with the longest base-path prefix of `path`.
    #[must_use]
    pub fn error_renderer_for(&self, path: &str) -> Option<&Arc<dyn ErrorRenderer>> {
        self.error_renderers
            .iter()
            .filter(|(base, _)| base.is_empty() || path.starts_with(base.as_str()))
            .max_by_key(|(base, _)| base.len())
            .map(|(_, renderer)| renderer)
    }
}
