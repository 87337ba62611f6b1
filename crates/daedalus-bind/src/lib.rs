//! # Daedalus Bind
//!
//! Binds a declarative API description to the Daedalus router.
//!
//! For each declared operation the [`Binder`] translates the path template
//! to the router's syntax, compiles the operation's features into one step
//! pipeline, and registers the composite handler. Per API root it also
//! registers the document exposure route and the configured error renderer.
//!
//! ```ignore
//! use daedalus_bind::{BindConfig, Binder};
//! use daedalus_router::Router;
//!
//! let binder = Binder::new(BindConfig::default());
//! let mut router = Router::new();
//! binder.bind(&mut router, &roots)?;
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus-bind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod docs;
pub mod error;
pub mod paths;
pub mod registrar;

// Re-export main types at crate root
pub use config::{default_access_filter, AccessFilter, BindConfig, BindConfigBuilder,
    DEFAULT_DOCS_PATH};
pub use docs::DocsRoute;
pub use error::BindError;
pub use paths::translate;
pub use registrar::Binder;
