//! Handlers for lists.
//!
//! List routes outside `/boards/{id}` resolve the owning board from the list
//! row before calling the store.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pinboard_core::activity::ActivityType;
use pinboard_core::board::require_text;
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use pinboard_db::models::list::{List, ListTitleRequest};
use pinboard_db::repositories::ListRepo;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::notify;
use crate::middleware::actor::ActorIdentity;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a list exists, returning the full row.
pub(crate) async fn ensure_list_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<List> {
    ListRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "List",
            id,
        })
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/boards/{id}/lists
pub async fn create_list(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(board_id): Path<DbId>,
    Json(body): Json<ListTitleRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let title = require_text(&body.title, "title")?;

    let list = ListRepo::create(&state.pool, board_id, &title, &actor).await?;

    notify(
        &state,
        board_id,
        ActivityType::ListCreated,
        json!({ "listId": list.id }),
    );
    Ok((StatusCode::CREATED, Json(json!({ "list": list }))))
}

/// PATCH /api/v1/lists/{id}
pub async fn rename_list(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
    Json(body): Json<ListTitleRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let title = require_text(&body.title, "title")?;
    let existing = ensure_list_exists(&state.pool, id).await?;

    let list = ListRepo::rename(&state.pool, existing.board_id, id, &title, &actor).await?;

    notify(
        &state,
        list.board_id,
        ActivityType::ListRenamed,
        json!({ "listId": id }),
    );
    Ok(Json(json!({ "list": list })))
}

/// DELETE /api/v1/lists/{id}
///
/// Cards in the list are removed with it and are not individually logged.
pub async fn delete_list(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_list_exists(&state.pool, id).await?;

    let deleted = ListRepo::delete(&state.pool, existing.board_id, id, &actor).await?;

    notify(
        &state,
        deleted.board_id,
        ActivityType::ListDeleted,
        json!({ "listId": id, "cardCount": deleted.card_count }),
    );
    Ok(Json(json!({
        "deleted": true,
        "listId": deleted.list_id,
        "boardId": deleted.board_id,
        "cardCount": deleted.card_count,
    })))
}
