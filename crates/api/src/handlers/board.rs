//! Handlers for boards.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pinboard_core::activity::ActivityType;
use pinboard_core::board::{require_text, resolve_board_name};
use pinboard_core::types::DbId;
use pinboard_db::models::board::{CreateBoardRequest, RenameBoardRequest};
use pinboard_db::repositories::BoardRepo;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::notify;
use crate::middleware::actor::ActorIdentity;
use crate::state::AppState;

/// GET /api/v1/boards
pub async fn list_boards(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let boards = BoardRepo::list(&state.pool).await?;
    tracing::debug!(count = boards.len(), "Listed boards");
    Ok(Json(json!({ "boards": boards })))
}

/// POST /api/v1/boards
///
/// Creates the board with its Todo / Doing / Done lists.
pub async fn create_board(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Json(body): Json<CreateBoardRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let name = resolve_board_name(body.name.as_deref());

    let created = BoardRepo::create_with_defaults(&state.pool, &name, &actor).await?;

    notify(
        &state,
        created.board.id,
        ActivityType::BoardCreated,
        json!({ "boardId": created.board.id }),
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/boards/{id}
pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let board_state = BoardRepo::state(&state.pool, id).await?;
    Ok(Json(board_state))
}

/// PATCH /api/v1/boards/{id}
pub async fn rename_board(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
    Json(body): Json<RenameBoardRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let name = require_text(&body.name, "name")?;

    let board = BoardRepo::rename(&state.pool, id, &name, &actor).await?;

    notify(&state, id, ActivityType::BoardRenamed, json!({ "boardId": id }));
    Ok(Json(json!({ "board": board })))
}

/// DELETE /api/v1/boards/{id}
pub async fn delete_board(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    BoardRepo::delete(&state.pool, id).await?;

    tracing::info!(board_id = id, client_id = %actor.client_id, "Board deleted by client");
    notify(&state, id, ActivityType::BoardDeleted, json!({ "boardId": id }));
    Ok(Json(json!({ "deleted": true, "boardId": id })))
}
