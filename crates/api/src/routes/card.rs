//! Route definitions for cards.
//!
//! ```text
//! LIST-SCOPED (merged into /lists):
//! POST   /{id}/cards      create_card
//!
//! CARD-LEVEL (mounted at /cards):
//! PATCH  /{id}            update_card
//! DELETE /{id}            delete_card
//! POST   /{id}/move       move_card
//! ```

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::card;
use crate::state::AppState;

/// List-scoped card routes, merged into the `/lists` router.
pub fn list_card_router() -> Router<AppState> {
    Router::new().route("/{id}/cards", post(card::create_card))
}

/// Card-level routes, mounted at `/cards`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", patch(card::update_card).delete(card::delete_card))
        .route("/{id}/move", post(card::move_card))
}
