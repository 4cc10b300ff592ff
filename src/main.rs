//! Receptor MCP Server
//!
//! Serves the Receptor catalog over stdio until stdin closes or the process
//! receives SIGINT/SIGTERM.

use anyhow::{Context, Result};
use receptor_mcp::{catalog, logging, McpServer, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

const APP_NAME: &str = "receptor-mcp-server";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is the response stream, so logs go to stderr
    logging::init_tracing();

    let config = ServerConfig::from_env().context("Invalid RECEPTOR_MCP_* configuration")?;
    let server = McpServer::with_config(APP_NAME, APP_VERSION, config);
    catalog::register_receptor_catalog(&server).await;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    info!("Ready for MCP communication via stdio");
    server.run(cancel).await?;
    Ok(())
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    wait_for_signal().await;
    info!("Received shutdown signal, stopping server");
    cancel.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Could not install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
