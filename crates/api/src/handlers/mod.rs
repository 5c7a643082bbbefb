//! HTTP handlers, one module per resource.
//!
//! Every mutating handler commits through the store first and only then
//! publishes a signal on the board's channel, so a failed publish can never
//! undo a committed change.

pub mod activity;
pub mod board;
pub mod card;
pub mod list;

use pinboard_core::activity::ActivityType;
use pinboard_core::types::DbId;

use crate::state::AppState;

/// Tell the board's viewers that something changed.
fn notify(state: &AppState, board_id: DbId, reason: ActivityType, payload: serde_json::Value) {
    let delivered = state.notifier.publish(board_id, reason.as_str(), payload);
    tracing::debug!(board_id, reason = %reason, delivered, "Board change published");
}
