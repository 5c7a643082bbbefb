//! HTTP-level integration tests for the activity log.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, create_board, create_card, get, post_empty, send};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_activity_newest_first_with_limit(pool: PgPool) {
    let app = build_test_app(pool);
    let created = create_board(app.clone(), "Log").await;
    let board_id = created["board"]["id"].as_i64().unwrap();
    let todo = created["lists"][0]["id"].as_i64().unwrap();
    let card = create_card(app.clone(), todo, "Logged").await;

    let response = get(app.clone(), &format!("/api/v1/boards/{board_id}/activity")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_json(response).await["events"].as_array().unwrap().clone();
    let types: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        ["card.created", "list.created", "list.created", "list.created", "board.created"]
    );

    let newest = &events[0];
    assert_eq!(newest["entityType"], "CARD");
    assert_eq!(newest["entityId"], card["id"]);
    assert_eq!(newest["actorClientId"], common::TEST_CLIENT);
    assert_eq!(newest["actorName"], "Tester");
    assert_eq!(newest["data"]["after"]["title"], "Logged");

    let response = get(app, &format!("/api/v1/boards/{board_id}/activity?limit=2")).await;
    assert_eq!(body_json(response).await["events"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_activity_for_missing_board_returns_404(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/v1/boards/999999/activity").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_activity_requires_client_id(pool: PgPool) {
    let app = build_test_app(pool);
    let created = create_board(app.clone(), "Anon").await;
    let board_id = created["board"]["id"].as_i64().unwrap();

    let response = send(
        app,
        Method::GET,
        &format!("/api/v1/boards/{board_id}/activity"),
        None,
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Clearing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_clear_hides_history_for_that_client_only(pool: PgPool) {
    let app = build_test_app(pool);
    let created = create_board(app.clone(), "Clear").await;
    let board_id = created["board"]["id"].as_i64().unwrap();
    let todo = created["lists"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/boards/{board_id}/activity");

    let response = post_empty(app.clone(), &format!("{uri}/clear")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["cleared"], true);
    assert!(json["eventId"].is_i64());
    assert!(json["at"].is_string());

    // The clearing client sees an empty log, then only what comes after.
    let events = body_json(get(app.clone(), &uri).await).await["events"].clone();
    assert!(events.as_array().unwrap().is_empty());

    create_card(app.clone(), todo, "After clear").await;
    let events = body_json(get(app.clone(), &uri).await).await["events"].clone();
    let types: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["card.created"]);

    // Another client still sees the full history, without the marker.
    let response = send(app, Method::GET, &uri, Some("other-client"), None).await;
    let events = body_json(response).await["events"].clone();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e["type"] != "activity.cleared"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_clear_missing_board_returns_404(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_empty(app, "/api/v1/boards/999999/activity/clear").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_corrupt_event_returns_422(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let created = create_board(app.clone(), "Corrupt").await;
    let board_id = created["board"]["id"].as_i64().unwrap();

    sqlx::query(
        "UPDATE activity_events SET data = '{\"unexpected\": true}' \
         WHERE board_id = $1 AND event_type = 'board.created'",
    )
    .bind(board_id)
    .execute(&pool)
    .await
    .unwrap();

    let response = get(app, &format!("/api/v1/boards/{board_id}/activity")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INVALID_DATA");
}
