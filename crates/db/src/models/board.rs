//! Board entity model and DTOs.

use pinboard_core::activity::{BoardName, BoardSnapshot};
use pinboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::card::Card;
use crate::models::label::Label;
use crate::models::list::List;

/// A row from the `boards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn name_snapshot(&self) -> BoardName {
        BoardName {
            name: self.name.clone(),
        }
    }
}

/// DTO for creating a board. A missing name falls back to the default.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(max = 120))]
    pub name: Option<String>,
}

/// DTO for renaming a board.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameBoardRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// A freshly created board with its default lists.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBoard {
    pub board: Board,
    pub lists: Vec<List>,
}

/// Everything a viewer needs to render a board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardState {
    pub board: Board,
    pub lists: Vec<List>,
    pub cards: Vec<Card>,
    pub labels: Vec<Label>,
}
