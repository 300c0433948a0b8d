pub mod error;
pub mod route;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::config::Config;
use crate::error::{StorefrontError, StorefrontResult};
use crate::server::route::server_router;
use crate::types::params::ServerParams;

pub use error::SchemaRouteError;

/// Handle for managing the HTTP server lifecycle.
pub struct ServerHandle {
    shutdown_token: CancellationToken,
    task_handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Initiates graceful shutdown and waits for in-flight requests to complete.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Initiating server graceful shutdown");
        self.shutdown_token.cancel();
        self.task_handle.await
    }
}

/// Binds the listener and serves the routes from a separate tokio task.
///
/// # Returns
/// * `(SocketAddr, ServerHandle)` - The bound address and handle for managing the server
pub async fn setup_server(config: Arc<Config>) -> StorefrontResult<(SocketAddr, ServerHandle)> {
    let (api_server_url, listener) = get_server_url(config.server_config()).await?;

    let shutdown_token = CancellationToken::new();
    let server_token = shutdown_token.clone();

    let app = server_router(config);
    let task_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(server_token.cancelled_owned()).await {
            error!(error = %e, "HTTP server stopped with an error");
        }
    });

    info!(address = %api_server_url, "🌐 HTTP server listening");
    Ok((api_server_url, ServerHandle { shutdown_token, task_handle }))
}

pub(crate) async fn get_server_url(
    server_params: &ServerParams,
) -> StorefrontResult<(SocketAddr, tokio::net::TcpListener)> {
    // In test mode, use port 0 to get a random available port
    let port = if cfg!(test) { 0 } else { server_params.port };

    let address = format!("{}:{}", server_params.host, port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| StorefrontError::ServerError(format!("Failed to bind {}: {}", address, e)))?;
    let api_server_url = listener.local_addr()?;

    Ok((api_server_url, listener))
}
