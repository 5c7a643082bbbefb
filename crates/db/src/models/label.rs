//! Label entity model.

use pinboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `labels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: DbId,
    pub board_id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
}
