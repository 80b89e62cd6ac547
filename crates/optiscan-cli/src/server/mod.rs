//! HTTP server startup and lifecycle management.

mod shutdown;

use std::io;

use axum::Router;
pub use shutdown::shutdown_signal;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Error raised when the HTTP server fails to start or crashes.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Server configuration failed validation.
    #[error("invalid server configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind the listener to the configured address.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server runtime error: {0}")]
    Runtime(#[from] io::Error),
}

/// Starts the HTTP gateway with graceful shutdown.
///
/// Validates the configuration, binds the listener, and serves requests
/// until a shutdown signal arrives.
pub async fn serve_http(app: Router, config: ServerConfig) -> Result<(), ServerError> {
    if let Err(err) = config.validate() {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %err,
            "Invalid server configuration"
        );
        return Err(ServerError::InvalidConfig(err.to_string()));
    }

    config.log();
    let addr = config.server_addr();

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_STARTUP,
                addr = %addr,
                error = %err,
                "Failed to bind to address"
            );
            return Err(ServerError::Bind {
                address: addr.to_string(),
                source: err,
            });
        }
    };

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %addr,
        "Gateway is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Gateway is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Gateway encountered an error"
            );
            ServerError::Runtime(err)
        })?;

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Gateway shut down gracefully");
    Ok(())
}
