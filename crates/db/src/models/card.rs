//! Card entity model and DTOs.

use pinboard_core::activity::{CardFields, CardPlacement, CardSnapshot};
use pinboard_core::card::CardPatch;
use pinboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: DbId,
    pub board_id: DbId,
    pub list_id: DbId,
    pub title: String,
    pub description: String,
    pub due_at: Option<Timestamp>,
    pub position: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Card {
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            id: self.id,
            board_id: self.board_id,
            list_id: self.list_id,
            title: self.title.clone(),
            description: self.description.clone(),
            due_at: self.due_at,
            position: self.position,
        }
    }

    pub fn fields(&self) -> CardFields {
        CardFields {
            title: self.title.clone(),
            description: self.description.clone(),
            due_at: self.due_at,
        }
    }

    pub fn placement(&self) -> CardPlacement {
        CardPlacement {
            list_id: self.list_id,
            position: self.position,
        }
    }
}

/// DTO for creating a card.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub due_at: Option<Timestamp>,
}

/// DTO for a partial card update.
///
/// An absent field is left unchanged; `"dueAt": null` clears the due date.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub due_at: Option<Option<Timestamp>>,
}

impl UpdateCardRequest {
    pub fn into_patch(self) -> CardPatch {
        CardPatch {
            title: self.title,
            description: self.description,
            due_at: self.due_at,
        }
    }
}

/// DTO for moving a card.
///
/// `before_card_id` is the card that ends up directly above the moved card,
/// `after_card_id` the one directly below it. Both must live in
/// `to_list_id`. With neither, the card is appended to the list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub to_list_id: DbId,
    pub before_card_id: Option<DbId>,
    pub after_card_id: Option<DbId>,
}

/// Result of deleting a card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCard {
    pub card_id: DbId,
    pub board_id: DbId,
}
