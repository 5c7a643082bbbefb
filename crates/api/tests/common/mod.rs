#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pinboard_api::config::ServerConfig;
use pinboard_api::router::build_app_router;
use pinboard_api::state::AppState;
use pinboard_api::ws::WsManager;
use pinboard_events::BoardNotifier;

/// Client id sent by the request helpers unless a test picks its own.
pub const TEST_CLIENT: &str = "test-client";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        ws_keepalive_secs: 25,
        database_max_connections: 5,
    }
}

/// Build the test state around `pool`. Tests that want to observe board
/// signals keep a clone and subscribe to `state.notifier`.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        notifier: Arc::new(BoardNotifier::new()),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool), &test_config())
}

/// Send a request as `client` and return the raw response.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    client: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(client) = client {
        builder = builder
            .header("x-client-id", client)
            .header("x-actor-name", "Tester");
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(TEST_CLIENT), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(TEST_CLIENT), Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(TEST_CLIENT), None).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(TEST_CLIENT), Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(TEST_CLIENT), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a board through the API; returns the `{board, lists}` body.
pub async fn create_board(app: Router, name: &str) -> serde_json::Value {
    let response = post_json(app, "/api/v1/boards", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Create a card through the API; returns the card object.
pub async fn create_card(app: Router, list_id: i64, title: &str) -> serde_json::Value {
    let response = post_json(
        app,
        &format!("/api/v1/lists/{list_id}/cards"),
        serde_json::json!({ "title": title }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["card"].clone()
}

/// Newest activity event on the board, as `test-client` sees it.
pub async fn latest_event(app: Router, board_id: i64) -> serde_json::Value {
    let response = get(app, &format!("/api/v1/boards/{board_id}/activity?limit=1")).await;
    body_json(response).await["events"][0].clone()
}
