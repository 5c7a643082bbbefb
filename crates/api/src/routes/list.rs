//! Route definitions for lists.
//!
//! ```text
//! BOARD-SCOPED (merged into /boards):
//! POST   /{id}/lists      create_list
//!
//! LIST-LEVEL (mounted at /lists):
//! PATCH  /{id}            rename_list
//! DELETE /{id}            delete_list
//! ```

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::list;
use crate::state::AppState;

/// Board-scoped list routes, merged into the `/boards` router.
pub fn board_list_router() -> Router<AppState> {
    Router::new().route("/{id}/lists", post(list::create_list))
}

/// List-level routes, mounted at `/lists`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", patch(list::rename_list).delete(list::delete_list))
}
