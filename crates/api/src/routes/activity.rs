//! Route definitions for the activity log.
//!
//! ```text
//! BOARD-SCOPED (merged into /boards):
//! GET  /{id}/activity             list_activity (?limit)
//! POST /{id}/activity/clear       clear_activity
//!
//! EVENT-LEVEL (mounted at /activity):
//! POST /{event_id}/undo           undo_event
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Board-scoped activity routes, merged into the `/boards` router.
pub fn board_activity_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/activity", get(activity::list_activity))
        .route("/{id}/activity/clear", post(activity::clear_activity))
}

/// Event-level routes, mounted at `/activity`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{event_id}/undo", post(activity::undo_event))
}
