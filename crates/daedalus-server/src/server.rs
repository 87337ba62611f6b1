//! HTTP server.
//!
//! Accepts connections on a Tokio TCP listener, buffers each request body,
//! and hands the buffered request to the router's dispatch. Shutdown is
//! graceful: the accept loop stops on the shutdown signal, then in-flight
//! connections are drained up to the configured timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .http_addr("0.0.0.0:8080")
//!         .router(router)
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use daedalus_core::types::{Response, ResponseExt};
use daedalus_router::Router;

use crate::config::ServerConfig;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The Daedalus HTTP server.
///
/// Owns the router and drives its dispatch for every incoming request.
pub struct Server {
    /// Server configuration.
    config: ServerConfig,

    /// The bound router.
    router: Arc<Router>,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with an explicit shutdown signal.
    ///
    /// Useful for tests and for embedding into larger lifecycles.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind the configured address.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {e}",
                self.config.http_addr()
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(%addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) =
                                    server.handle_connection(stream, remote_addr, shutdown).await
                                {
                                    tracing::error!(%remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        let drain_timeout = server.config.shutdown_timeout();
        tracing::info!(
            connections = tracker.active_connections(),
            ?drain_timeout,
            "draining in-flight connections"
        );

        tokio::select! {
            () = tracker.wait_for_drain() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(drain_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "shutdown timeout reached with connections still active"
                );
            }
        }

        Ok(())
    }

    /// Serves one connection.
    async fn handle_connection(
        self: Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |request: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(request).await }
        });

        let connection = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = connection => result,
            () = shutdown.recv() => {
                tracing::debug!(%remote_addr, "connection closed by shutdown");
                Ok(())
            }
        }
    }

    /// Buffers the request body and dispatches through the router.
    async fn handle_request(
        self: Arc<Self>,
        request: http::Request<Incoming>,
    ) -> Result<Response, Infallible> {
        let timeout = self.config.request_timeout();
        let (parts, body) = request.into_parts();

        let body = match tokio::time::timeout(timeout, body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to read request body");
                return Ok(Response::json_error(
                    StatusCode::BAD_REQUEST,
                    "BODY_READ_ERROR",
                    &format!("failed to read request body: {e}"),
                ));
            }
            Err(_) => {
                tracing::warn!("request body collection timed out");
                return Ok(Response::json_error(
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    "request body collection timed out",
                ));
            }
        };

        let request = http::Request::from_parts(parts, body);
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match tokio::time::timeout(timeout, self.router.dispatch(request)).await {
            Ok(response) => Ok(response),
            Err(_) => {
                tracing::warn!(%method, %path, "handler timed out");
                Ok(Response::json_error(
                    StatusCode::GATEWAY_TIMEOUT,
                    "HANDLER_TIMEOUT",
                    "handler execution timed out",
                ))
            }
        }
    }
}

/// Builder for [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: crate::config::ServerConfigBuilder,
    router: Option<Router>,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the router to serve.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful-shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config_builder.build(),
            router: Arc::new(self.router.unwrap_or_default()),
        }
    }
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// An I/O error occurred while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
