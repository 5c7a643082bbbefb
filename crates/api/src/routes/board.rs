//! Route definitions for boards.
//!
//! ```text
//! GET    /                list_boards
//! POST   /                create_board
//! GET    /{id}            get_board
//! PATCH  /{id}            rename_board
//! DELETE /{id}            delete_board
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::board;
use crate::state::AppState;

/// Board routes, mounted at `/boards`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board::list_boards).post(board::create_board))
        .route(
            "/{id}",
            get(board::get_board)
                .patch(board::rename_board)
                .delete(board::delete_board),
        )
}
