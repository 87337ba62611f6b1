//! # Daedalus Router
//!
//! The router collaborator of the Daedalus framework.
//!
//! The router owns the route table, the per-request execution contract, and
//! the failure-rendering seam:
//!
//! - [`Router`] - method + colon-syntax pattern registration, first match wins
//! - [`Router::dispatch`] - creates the per-request state and runs the
//!   matched handler to completion
//! - [`ErrorRenderer`] - per-base-path rendering of terminal failures
//!
//! The router's native parameter syntax is `:name` for a single segment and
//! `*name` for a trailing wildcard; brace-style templates must be translated
//! before registration.

#![doc(html_root_url = "https://docs.rs/daedalus-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod router;

// Re-export main types at crate root
pub use dispatch::{not_found, render_failure, ErrorRenderer};
pub use router::{RouteMatch, Router};
