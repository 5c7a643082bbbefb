//! Handlers for the activity log and undo.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use pinboard_core::activity::{clamp_activity_limit, ActivityType};
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use pinboard_db::models::activity::ActivityQuery;
use pinboard_db::repositories::{ActivityRepo, BoardRepo};
use pinboard_db::undo::{UndoEngine, UndoOutcome};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::notify;
use crate::middleware::actor::ActorIdentity;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /boards/{id}/activity
// ---------------------------------------------------------------------------

/// List the board's activity, newest first, as seen by the requesting
/// client (history it cleared is hidden).
pub async fn list_activity(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(board_id): Path<DbId>,
    Query(params): Query<ActivityQuery>,
) -> AppResult<impl IntoResponse> {
    if BoardRepo::find_by_id(&state.pool, board_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Board",
            id: board_id,
        }));
    }

    let limit = clamp_activity_limit(params.limit);
    let events =
        ActivityRepo::list_for_board(&state.pool, board_id, Some(&actor.client_id), limit).await?;

    tracing::debug!(board_id, count = events.len(), limit, "Listed activity");
    Ok(Json(json!({ "events": events })))
}

// ---------------------------------------------------------------------------
// POST /boards/{id}/activity/clear
// ---------------------------------------------------------------------------

/// Hide everything logged so far from the requesting client's activity
/// view. Other clients keep seeing the full history.
pub async fn clear_activity(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let marker = ActivityRepo::clear(&state.pool, board_id, &actor).await?;

    notify(
        &state,
        board_id,
        ActivityType::ActivityCleared,
        json!({ "eventId": marker.id, "clientId": actor.client_id }),
    );
    Ok(Json(json!({
        "cleared": true,
        "eventId": marker.id,
        "at": marker.created_at,
    })))
}

// ---------------------------------------------------------------------------
// POST /activity/{eventId}/undo
// ---------------------------------------------------------------------------

/// Undo one card event. Repeating the call is a successful no-op.
pub async fn undo_event(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match UndoEngine::undo(&state.pool, event_id, &actor).await? {
        UndoOutcome::Undone {
            effect,
            board_id,
            card_id,
            card,
            event,
        } => {
            notify(
                &state,
                board_id,
                ActivityType::CardUndone,
                json!({ "cardId": card_id, "eventId": event_id, "effect": effect }),
            );
            Ok(Json(json!({
                "undone": true,
                "effect": effect,
                "eventId": event_id,
                "undoEventId": event.id,
                "cardId": card_id,
                "card": card,
            })))
        }
        UndoOutcome::AlreadyUndone { event_id } => {
            tracing::debug!(event_id, "Undo repeated, nothing to do");
            Ok(Json(json!({ "alreadyUndone": true, "eventId": event_id })))
        }
    }
}
