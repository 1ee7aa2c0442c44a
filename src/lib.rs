/// Public library interface for the MCP Subfinder server
///
/// This module exports the server implementation and the public types
/// that can be used by other applications or tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod enumeration;
pub mod mcp;
pub mod tools;

// Re-export public modules and types
pub use enumeration::{
    enumerate_subdomains, EnumerationConfig, EnumerationContext, EnumerationError, ProviderError,
    ProviderOptions, ResultSet, SubdomainProvider, SubfinderCliProvider,
};
pub use mcp::{McpServer, RpcReply};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Subfinder server that implements the MCP protocol over HTTP
///
/// Owns the dispatcher and the root cancellation token; cancelling the
/// token stops in-flight enumerations and the listener.
pub struct SubfinderServer {
    dispatcher: Arc<McpServer>,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

impl SubfinderServer {
    /// Create a new server backed by `provider`
    pub fn new(provider: Arc<dyn SubdomainProvider>) -> Self {
        Self {
            dispatcher: Arc::new(McpServer::new(provider)),
            shutdown: CancellationToken::new(),
            request_timeout: mcp::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound the time spent on a single HTTP request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The axum router serving `/mcp` and `/health`
    pub fn router(&self) -> axum::Router {
        mcp::router(self.dispatcher.clone(), self.shutdown.clone(), self.request_timeout)
    }

    /// Token cancelled when the server shuts down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve on `addr` until SIGINT/SIGTERM or the shutdown token fires
    pub async fn run(self, addr: SocketAddr) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %listener.local_addr()?, "MCP Subfinder server listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
        _ = shutdown.cancelled() => {}
    }

    shutdown.cancel();
}
