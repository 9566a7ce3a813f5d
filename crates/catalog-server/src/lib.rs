//! Catalog Server - Item Listing API
//!
//! HTTP server exposing paginated search over a flat JSON item collection,
//! item lookup and creation, and cached collection statistics.

pub mod config;
pub mod error;
pub mod http;

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use catalog_core::{IdGenerator, ItemStore, JsonFileStore, StatsCache};

use crate::config::ServerConfig;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub stats: StatsCache,
    pub ids: IdGenerator,
    /// Drop cached stats after each successful create
    pub invalidate_stats_on_write: bool,
}

impl AppState {
    /// Create state over any store, with stale-by-default stats
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            store,
            stats: StatsCache::new(),
            ids: IdGenerator::new(),
            invalidate_stats_on_write: false,
        }
    }

    /// Create state backed by the configured JSON file
    pub fn from_config(config: &ServerConfig) -> Self {
        let store = JsonFileStore::new(&config.data_path);
        tracing::info!("Using item file {:?}", store.path());

        let mut state = Self::new(Arc::new(store));
        state.invalidate_stats_on_write = config.invalidate_stats_on_write;
        state
    }

    pub fn with_invalidate_on_write(mut self, enabled: bool) -> Self {
        self.invalidate_stats_on_write = enabled;
        self
    }

    /// Compute stats once up front so the first request is served from cache.
    ///
    /// Failure is logged and leaves the cache empty.
    pub fn warm_stats(&self) {
        match self.stats.refresh(self.store.as_ref()) {
            Ok(snapshot) => tracing::info!(
                "Stats cache warmed: {} items, average price {}",
                snapshot.total,
                snapshot.average_price
            ),
            Err(e) => tracing::warn!("Failed to warm stats cache: {}", e),
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Item endpoints
        .route("/api/items", get(http::list_items))
        .route("/api/items", post(http::create_item))
        .route("/api/items/{id}", get(http::get_item))
        // Stats endpoint
        .route("/api/stats", get(http::get_stats))
        .fallback(http::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    serve_with_shutdown(addr, state, std::future::pending()).await
}

/// Start the server and stop accepting connections once `shutdown` resolves
pub async fn serve_with_shutdown(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Catalog server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
