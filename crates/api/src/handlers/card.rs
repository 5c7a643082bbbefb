//! Handlers for cards.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pinboard_core::activity::ActivityType;
use pinboard_core::board::require_text;
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use pinboard_db::models::card::{CreateCardRequest, MoveCardRequest, UpdateCardRequest};
use pinboard_db::repositories::CardRepo;
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::list::ensure_list_exists;
use crate::handlers::notify;
use crate::middleware::actor::ActorIdentity;
use crate::state::AppState;

/// POST /api/v1/lists/{id}/cards
///
/// Appends the card to the end of the list.
pub async fn create_card(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(list_id): Path<DbId>,
    Json(body): Json<CreateCardRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let input = CreateCardRequest {
        title: require_text(&body.title, "title")?,
        ..body
    };
    let list = ensure_list_exists(&state.pool, list_id).await?;

    let card = CardRepo::create(&state.pool, list.board_id, list_id, &input, &actor).await?;

    notify(
        &state,
        card.board_id,
        ActivityType::CardCreated,
        json!({ "cardId": card.id, "listId": list_id }),
    );
    Ok((StatusCode::CREATED, Json(json!({ "card": card }))))
}

/// PATCH /api/v1/cards/{id}
///
/// Absent fields are left alone; `"dueAt": null` clears the due date.
pub async fn update_card(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateCardRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let mut patch = body.into_patch();
    if patch.is_empty() {
        return Err(CoreError::Validation(
            "at least one of title, description or dueAt is required".into(),
        )
        .into());
    }
    if let Some(title) = &patch.title {
        patch.title = Some(require_text(title, "title")?);
    }

    let card = CardRepo::update(&state.pool, id, &patch, &actor).await?;

    notify(
        &state,
        card.board_id,
        ActivityType::CardUpdated,
        json!({ "cardId": id }),
    );
    Ok(Json(json!({ "card": card })))
}

/// POST /api/v1/cards/{id}/move
pub async fn move_card(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
    Json(body): Json<MoveCardRequest>,
) -> AppResult<impl IntoResponse> {
    let card = CardRepo::move_card(&state.pool, id, &body, &actor).await?;

    notify(
        &state,
        card.board_id,
        ActivityType::CardMoved,
        json!({ "cardId": id, "listId": card.list_id }),
    );
    Ok(Json(json!({ "card": card })))
}

/// DELETE /api/v1/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CardRepo::delete(&state.pool, id, &actor).await?;

    notify(
        &state,
        deleted.board_id,
        ActivityType::CardDeleted,
        json!({ "cardId": id }),
    );
    Ok(Json(json!({
        "deleted": true,
        "cardId": deleted.card_id,
        "boardId": deleted.board_id,
    })))
}
