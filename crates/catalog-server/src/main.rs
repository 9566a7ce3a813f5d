//! Catalog Server Binary
//!
//! Standalone server for the catalog item API.

use std::sync::Arc;

use catalog_server::{config::ServerConfig, serve_with_shutdown, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load()?;
    let state = AppState::from_config(&config);
    state.warm_stats();

    serve_with_shutdown(&config.bind_addr, Arc::new(state), shutdown_signal()).await?;

    tracing::info!("Catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
