//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use catalog_core::{find_item, paginate, Item, ItemQuery, NewItem, Page};

use crate::error::ApiError;
use crate::AppState;

/// Body of a failed stats request
pub const STATS_UNAVAILABLE: &str = "Unable to load stats";

// ============================================================================
// Items
// ============================================================================

/// List items, optionally filtered by `q`, one page at a time
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Page<Item>>, ApiError> {
    let page = tokio::task::spawn_blocking(move || {
        state
            .store
            .read_all()
            .map(|items| paginate(items, &query))
    })
    .await??;

    tracing::debug!(
        page = page.page,
        limit = page.limit,
        total = page.total,
        "Listed items"
    );
    Ok(Json(page))
}

/// Get a single item by id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let item = tokio::task::spawn_blocking(move || {
        let items = state.store.read_all()?;
        find_item(items, &id)
    })
    .await??;

    Ok(Json(item))
}

/// Create an item.
///
/// Any JSON object is accepted and stored as given apart from the generated
/// id. The whole collection is rewritten.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(payload) = payload?;
    let item = tokio::task::spawn_blocking(move || -> catalog_core::Result<Item> {
        let mut items = state.store.read_all()?;
        let item = payload.into_item(state.ids.next_id());
        items.push(item.clone());
        state.store.write_all(&items)?;

        if state.invalidate_stats_on_write {
            state.stats.invalidate();
        }
        Ok(item)
    })
    .await??;

    tracing::info!("Created item {} ({})", item.id, item.name());
    Ok((StatusCode::CREATED, Json(item)))
}

// ============================================================================
// Stats
// ============================================================================

/// Collection statistics, served from cache when available
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    let result =
        tokio::task::spawn_blocking(move || state.stats.get_or_load(state.store.as_ref())).await;

    match result {
        Ok(Ok(lookup)) => Json(lookup).into_response(),
        Ok(Err(_)) => stats_unavailable(),
        Err(e) => {
            tracing::error!("Stats task failed: {}", e);
            stats_unavailable()
        }
    }
}

fn stats_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": STATS_UNAVAILABLE })),
    )
        .into_response()
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
