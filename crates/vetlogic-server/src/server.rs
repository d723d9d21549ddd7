//! Proxy server lifecycle.
//!
//! [`start_server`] binds the configured address and serves until the
//! process receives `Ctrl-C`.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use vetlogic_core::collab::{CaseGenerator, QuestionBank};
use vetlogic_core::config::ServerConfig;
use vetlogic_store::SaveStorage;

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server failed while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Serve the proxy API on `config.host:config.port`.
///
/// Returns `Ok(())` after a graceful shutdown.
pub async fn start_server<S, G, Q>(
    config: &ServerConfig,
    state: Arc<AppState<S, G, Q>>,
) -> Result<(), StartError>
where
    S: SaveStorage + 'static,
    G: CaseGenerator + 'static,
    Q: QuestionBank + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| StartError::Bind(format!("invalid address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| StartError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "VetLogic proxy listening");
    info!("health check: http://{addr}/api/health");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartError::Serve(e.to_string()))?;

    info!("VetLogic proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
