//! List entity model and DTOs.

use pinboard_core::activity::{ListSnapshot, ListTitle};
use pinboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: DbId,
    pub board_id: DbId,
    pub title: String,
    pub position: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl List {
    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            id: self.id,
            board_id: self.board_id,
            title: self.title.clone(),
            position: self.position,
        }
    }

    pub fn title_snapshot(&self) -> ListTitle {
        ListTitle {
            title: self.title.clone(),
        }
    }
}

/// DTO for creating or renaming a list.
#[derive(Debug, Deserialize, Validate)]
pub struct ListTitleRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
}

/// Result of deleting a list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedList {
    pub list_id: DbId,
    pub board_id: DbId,
    pub card_count: i64,
}
