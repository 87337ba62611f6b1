//! # Daedalus Server
//!
//! HTTP server for the Daedalus framework, built on Hyper and Tokio.
//!
//! The server owns a bound [`Router`](daedalus_router::Router) and, for each
//! request, buffers the body and runs the router's dispatch. Shutdown is
//! graceful: in-flight connections are drained up to a configurable timeout.

#![doc(html_root_url = "https://docs.rs/daedalus-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod server;
pub mod shutdown;

// Re-export main types at crate root
pub use config::{ServerConfig, ServerConfigBuilder};
pub use server::{Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
