//! Router-level tests for the catalog API
//!
//! Requests go through the full router with `oneshot`; storage is an
//! in-memory store whose reads and writes can be made to fail.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use catalog_core::{Item, ItemStore, JsonFileStore, MemoryStore};
use catalog_server::{create_router, AppState};

fn mock_items() -> Vec<Item> {
    vec![Item::new(1, "Item A", 10.0), Item::new(2, "Item B", 20.0)]
}

fn mock_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_items(mock_items()))
}

fn app(store: Arc<MemoryStore>) -> Router {
    create_router(Arc::new(AppState::new(store)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// === GET /api/items ===

#[tokio::test]
async fn test_list_returns_all_items() {
    let (status, body) = get(app(mock_store()), "/api/items").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["total"], 2);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["name"], "Item A");
}

#[tokio::test]
async fn test_list_filters_by_query() {
    let (status, body) = get(app(mock_store()), "/api/items?q=item%20b").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(
        body["results"],
        json!([{ "id": 2, "name": "Item B", "price": 20.0 }])
    );
}

#[tokio::test]
async fn test_list_limits_results() {
    let (status, body) = get(app(mock_store()), "/api/items?limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn test_list_second_page() {
    let (_, body) = get(app(mock_store()), "/api/items?limit=1&page=2").await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["results"][0]["id"], 2);
}

#[tokio::test]
async fn test_list_clamps_page_and_limit() {
    let (status, body) = get(app(mock_store()), "/api/items?page=0&limit=-3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_read_error_is_500() {
    let store = mock_store();
    store.fail_reads(true);

    let (status, body) = get(app(store), "/api/items").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
}

// === GET /api/items/{id} ===

#[tokio::test]
async fn test_get_returns_item() {
    let (status, body) = get(app(mock_store()), "/api/items/2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Item B");
}

#[tokio::test]
async fn test_get_missing_is_404() {
    let (status, body) = get(app(mock_store()), "/api/items/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found");
}

#[tokio::test]
async fn test_get_non_numeric_id_is_404() {
    let (status, body) = get(app(mock_store()), "/api/items/abc").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found");
}

#[tokio::test]
async fn test_get_read_error_is_500() {
    let store = mock_store();
    store.fail_reads(true);

    let (status, _) = get(app(store), "/api/items/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// === POST /api/items ===

#[tokio::test]
async fn test_create_adds_item() {
    let store = mock_store();

    let (status, body) = post(
        app(store.clone()),
        "/api/items",
        json!({ "name": "Item C", "price": 30 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Item C");
    assert!(body["id"].is_i64());

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    let written = &writes[0];
    assert_eq!(written.len(), 3);
    assert_eq!(written[0], mock_items()[0]);
    assert_eq!(written[2].name(), "Item C");
    assert_eq!(Some(written[2].id), body["id"].as_i64());
}

#[tokio::test]
async fn test_create_keeps_extra_fields_and_replaces_id() {
    let store = mock_store();

    let (status, body) = post(
        app(store.clone()),
        "/api/items",
        json!({ "id": 1, "name": "Item D", "price": 40, "color": "blue" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["color"], "blue");
    assert_ne!(body["id"], 1);
}

#[tokio::test]
async fn test_create_stores_body_without_schema_check() {
    let store = mock_store();

    let (status, body) = post(
        app(store.clone()),
        "/api/items",
        json!({ "name": "Item C", "price": "30" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], "30");

    let (status, body) = post(app(store.clone()), "/api/items", json!({ "name": 5 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], 5);

    let (status, body) = post(app(store.clone()), "/api/items", json!({ "name": null })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], Value::Null);

    assert_eq!(store.snapshot().len(), 5);
}

#[tokio::test]
async fn test_loosely_typed_records_still_list_and_aggregate() {
    let store = mock_store();
    let router = app(store.clone());
    post(router.clone(), "/api/items", json!({ "name": 7, "price": "30" })).await;

    let (status, body) = get(router.clone(), "/api/items?q=item").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = get(router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["averagePrice"], 10.0);
}

#[tokio::test]
async fn test_create_malformed_body_is_json_error() {
    let store = mock_store();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/items")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let (status, body) = send(app(store.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_create_non_object_body_is_json_error() {
    let store = mock_store();

    let (status, body) = post(app(store.clone()), "/api/items", json!([1, 2])).await;

    assert!(status.is_client_error());
    assert!(body["message"].is_string());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_create_write_error_is_500() {
    let store = mock_store();
    store.fail_writes(true);

    let (status, body) = post(
        app(store.clone()),
        "/api/items",
        json!({ "name": "Item D", "price": 40 }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_create_read_error_skips_write() {
    let store = mock_store();
    store.fail_reads(true);

    let (status, _) = post(app(store.clone()), "/api/items", json!({ "name": "X" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_rapid_creates_get_distinct_ids() {
    let store = mock_store();
    let router = app(store.clone());

    let (_, first) = post(router.clone(), "/api/items", json!({ "name": "One" })).await;
    let (_, second) = post(router, "/api/items", json!({ "name": "Two" })).await;

    assert_ne!(first["id"], second["id"]);
    assert_eq!(store.snapshot().len(), 4);
}

// === GET /api/stats ===

#[tokio::test]
async fn test_stats_load_then_cache() {
    let router = app(mock_store());

    let (status, first) = get(router.clone(), "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total"], 2);
    assert_eq!(first["averagePrice"], 15.0);
    assert_eq!(first["cached"], false);
    assert!(first["cachedAt"].is_string());

    let (_, second) = get(router, "/api/stats").await;
    assert_eq!(second["cached"], true);
    assert_eq!(second["cachedAt"], first["cachedAt"]);
}

#[tokio::test]
async fn test_stats_warmed_at_startup_are_cached() {
    let state = AppState::new(mock_store());
    state.warm_stats();
    let router = create_router(Arc::new(state));

    let (_, body) = get(router, "/api/stats").await;
    assert_eq!(body["cached"], true);
    assert_eq!(body["averagePrice"], 15.0);
}

#[tokio::test]
async fn test_stats_empty_collection() {
    let (status, body) = get(app(Arc::new(MemoryStore::new())), "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["averagePrice"], 0.0);
}

#[tokio::test]
async fn test_stats_failure_is_500() {
    let store = mock_store();
    store.fail_reads(true);
    let router = app(store.clone());

    let (status, body) = get(router.clone(), "/api/stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Unable to load stats" }));

    store.fail_reads(false);
    let (status, body) = get(router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn test_stats_stay_stale_after_create_by_default() {
    let router = app(mock_store());
    get(router.clone(), "/api/stats").await;

    post(router.clone(), "/api/items", json!({ "name": "Item C", "price": 30 })).await;

    let (_, body) = get(router, "/api/stats").await;
    assert_eq!(body["cached"], true);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_stats_refresh_after_create_when_invalidating() {
    let state = AppState::new(mock_store()).with_invalidate_on_write(true);
    let router = create_router(Arc::new(state));
    get(router.clone(), "/api/stats").await;

    post(router.clone(), "/api/items", json!({ "name": "Item C", "price": 30 })).await;

    let (_, body) = get(router, "/api/stats").await;
    assert_eq!(body["cached"], false);
    assert_eq!(body["total"], 3);
    assert_eq!(body["averagePrice"], 20.0);
}

// === Misc ===

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, body) = get(app(mock_store()), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[tokio::test]
async fn test_json_file_backed_flow() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("items.json");
    let file_store = JsonFileStore::new(&path);
    file_store.write_all(&mock_items()).unwrap();

    let router = create_router(Arc::new(AppState::new(Arc::new(file_store.clone()))));

    let (status, created) = post(
        router.clone(),
        "/api/items",
        json!({ "name": "Item C", "price": 30 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let on_disk = file_store.read_all().unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(Some(on_disk[2].id), created["id"].as_i64());

    let uri = format!("/api/items/{}", on_disk[2].id);
    let (status, fetched) = get(router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Item C");
}
