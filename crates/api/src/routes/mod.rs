pub mod activity;
pub mod board;
pub mod card;
pub mod health;
pub mod list;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /boards                                 list, create
/// /boards/{id}                            full state, rename (PATCH), delete
/// /boards/{id}/lists                      create list (POST)
/// /boards/{id}/activity                   activity log (?limit)
/// /boards/{id}/activity/clear             hide history for this client (POST)
/// /boards/{id}/ws                         WebSocket
///
/// /lists/{id}                             rename (PATCH), delete
/// /lists/{id}/cards                       create card (POST)
///
/// /cards/{id}                             update (PATCH), delete
/// /cards/{id}/move                        move (POST)
///
/// /activity/{event_id}/undo               undo a card event (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Board routes (also nests board-scoped lists and activity).
        .nest(
            "/boards",
            board::router()
                .merge(list::board_list_router())
                .merge(activity::board_activity_router())
                .route("/{id}/ws", get(ws::ws_handler)),
        )
        .nest(
            "/lists",
            list::router().merge(card::list_card_router()),
        )
        .nest("/cards", card::router())
        .nest("/activity", activity::router())
}
