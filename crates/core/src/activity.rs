//! Typed activity payloads.
//!
//! Every mutation appends one activity event whose `data` carries `{before,
//! after}` snapshots of the affected entity. [`ActivityPayload`] is the sum
//! type of all event shapes; the persistence layer stores its tag in the
//! `event_type` column and its body in `data` (see [`ActivityPayload::encode`]
//! and [`ActivityPayload::decode`]). Both directions run [`validate`], so
//! consumers such as the undo planner only ever see well-formed values.
//!
//! A `()` snapshot serializes as JSON `null` and only accepts `null` back,
//! which is how "no before" / "no after" is expressed in the type.
//!
//! [`validate`]: ActivityPayload::validate

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default number of events returned by an activity listing.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

/// Upper bound for an activity listing.
pub const MAX_ACTIVITY_LIMIT: i64 = 200;

/// Clamp a caller-supplied listing limit to `[1, MAX_ACTIVITY_LIMIT]`.
pub fn clamp_activity_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}

// ---------------------------------------------------------------------------
// Entity and event types
// ---------------------------------------------------------------------------

/// Kind of entity an activity event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Board,
    List,
    Card,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "BOARD",
            Self::List => "LIST",
            Self::Card => "CARD",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOARD" => Ok(Self::Board),
            "LIST" => Ok(Self::List),
            "CARD" => Ok(Self::Card),
            other => Err(CoreError::InvalidData(format!(
                "unknown entity type '{other}'"
            ))),
        }
    }
}

/// Dot-separated activity event type, e.g. `card.moved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    #[serde(rename = "board.created")]
    BoardCreated,
    #[serde(rename = "board.renamed")]
    BoardRenamed,
    #[serde(rename = "board.deleted")]
    BoardDeleted,
    #[serde(rename = "list.created")]
    ListCreated,
    #[serde(rename = "list.renamed")]
    ListRenamed,
    #[serde(rename = "list.deleted")]
    ListDeleted,
    #[serde(rename = "card.created")]
    CardCreated,
    #[serde(rename = "card.updated")]
    CardUpdated,
    #[serde(rename = "card.moved")]
    CardMoved,
    #[serde(rename = "card.deleted")]
    CardDeleted,
    #[serde(rename = "card.undone")]
    CardUndone,
    #[serde(rename = "activity.cleared")]
    ActivityCleared,
}

impl ActivityType {
    pub const ALL: [ActivityType; 12] = [
        Self::BoardCreated,
        Self::BoardRenamed,
        Self::BoardDeleted,
        Self::ListCreated,
        Self::ListRenamed,
        Self::ListDeleted,
        Self::CardCreated,
        Self::CardUpdated,
        Self::CardMoved,
        Self::CardDeleted,
        Self::CardUndone,
        Self::ActivityCleared,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BoardCreated => "board.created",
            Self::BoardRenamed => "board.renamed",
            Self::BoardDeleted => "board.deleted",
            Self::ListCreated => "list.created",
            Self::ListRenamed => "list.renamed",
            Self::ListDeleted => "list.deleted",
            Self::CardCreated => "card.created",
            Self::CardUpdated => "card.updated",
            Self::CardMoved => "card.moved",
            Self::CardDeleted => "card.deleted",
            Self::CardUndone => "card.undone",
            Self::ActivityCleared => "activity.cleared",
        }
    }

    /// The entity kind events of this type are recorded against.
    pub fn entity_type(self) -> EntityType {
        match self {
            Self::BoardCreated | Self::BoardRenamed | Self::BoardDeleted => EntityType::Board,
            Self::ActivityCleared => EntityType::Board,
            Self::ListCreated | Self::ListRenamed | Self::ListDeleted => EntityType::List,
            Self::CardCreated
            | Self::CardUpdated
            | Self::CardMoved
            | Self::CardDeleted
            | Self::CardUndone => EntityType::Card,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidData(format!("unknown activity type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    pub id: DbId,
    pub board_id: DbId,
    pub title: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListTitle {
    pub title: String,
}

/// Every visible field of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: DbId,
    pub board_id: DbId,
    pub list_id: DbId,
    pub title: String,
    pub description: String,
    pub due_at: Option<Timestamp>,
    pub position: f64,
}

impl CardSnapshot {
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

/// The user-editable fields of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub title: String,
    pub description: String,
    pub due_at: Option<Timestamp>,
}

/// Where a card sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlacement {
    pub list_id: DbId,
    pub position: f64,
}

/// A `{before, after}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change<B, A> {
    pub before: B,
    pub after: A,
}

impl<B, A> Change<B, A> {
    pub fn new(before: B, after: A) -> Self {
        Self { before, after }
    }
}

impl<A> Change<(), A> {
    pub fn created(after: A) -> Self {
        Self { before: (), after }
    }
}

impl<B> Change<B, ()> {
    pub fn deleted(before: B) -> Self {
        Self { before, after: () }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeleted {
    pub before: ListSnapshot,
    pub after: (),
    /// Cards removed along with the list. They are not logged individually.
    pub card_count: i64,
}

/// What an undo did to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoEffect {
    /// Undo of `card.created`: the card was removed.
    Deleted,
    /// Undo of `card.moved` / `card.updated`: logged fields were written back.
    Reverted,
    /// Undo of `card.deleted`: the card was recreated with its original id.
    Restored,
}

impl UndoEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Reverted => "reverted",
            Self::Restored => "restored",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUndone {
    pub reverted_event_id: DbId,
    pub reverted_type: ActivityType,
    pub effect: UndoEffect,
    pub before: Option<CardSnapshot>,
    pub after: Option<CardSnapshot>,
}

// ---------------------------------------------------------------------------
// ActivityPayload
// ---------------------------------------------------------------------------

/// Body of an activity event, one variant per [`ActivityType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ActivityPayload {
    #[serde(rename = "board.created")]
    BoardCreated(Change<(), BoardSnapshot>),
    #[serde(rename = "board.renamed")]
    BoardRenamed(Change<BoardName, BoardName>),
    #[serde(rename = "board.deleted")]
    BoardDeleted(Change<BoardSnapshot, ()>),
    #[serde(rename = "list.created")]
    ListCreated(Change<(), ListSnapshot>),
    #[serde(rename = "list.renamed")]
    ListRenamed(Change<ListTitle, ListTitle>),
    #[serde(rename = "list.deleted")]
    ListDeleted(ListDeleted),
    #[serde(rename = "card.created")]
    CardCreated(Change<(), CardSnapshot>),
    #[serde(rename = "card.updated")]
    CardUpdated(Change<CardFields, CardFields>),
    #[serde(rename = "card.moved")]
    CardMoved(Change<CardPlacement, CardPlacement>),
    #[serde(rename = "card.deleted")]
    CardDeleted(Change<CardSnapshot, ()>),
    #[serde(rename = "card.undone")]
    CardUndone(CardUndone),
    #[serde(rename = "activity.cleared")]
    ActivityCleared(Change<(), ()>),
}

impl ActivityPayload {
    pub fn activity_type(&self) -> ActivityType {
        match self {
            Self::BoardCreated(_) => ActivityType::BoardCreated,
            Self::BoardRenamed(_) => ActivityType::BoardRenamed,
            Self::BoardDeleted(_) => ActivityType::BoardDeleted,
            Self::ListCreated(_) => ActivityType::ListCreated,
            Self::ListRenamed(_) => ActivityType::ListRenamed,
            Self::ListDeleted(_) => ActivityType::ListDeleted,
            Self::CardCreated(_) => ActivityType::CardCreated,
            Self::CardUpdated(_) => ActivityType::CardUpdated,
            Self::CardMoved(_) => ActivityType::CardMoved,
            Self::CardDeleted(_) => ActivityType::CardDeleted,
            Self::CardUndone(_) => ActivityType::CardUndone,
            Self::ActivityCleared(_) => ActivityType::ActivityCleared,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.activity_type().entity_type()
    }

    /// The event a `card.undone` payload reverts.
    pub fn reverted_event_id(&self) -> Option<DbId> {
        match self {
            Self::CardUndone(u) => Some(u.reverted_event_id),
            _ => None,
        }
    }

    /// Semantic checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::ListCreated(c) => check_position(c.after.position),
            Self::ListDeleted(d) => {
                check_position(d.before.position)?;
                if d.card_count < 0 {
                    return Err(CoreError::InvalidData(
                        "list.deleted cardCount must not be negative".into(),
                    ));
                }
                Ok(())
            }
            Self::CardCreated(c) => check_position(c.after.position),
            Self::CardDeleted(c) => check_position(c.before.position),
            Self::CardMoved(c) => {
                check_position(c.before.position)?;
                check_position(c.after.position)
            }
            Self::CardUndone(u) => {
                let shape_ok = match u.effect {
                    UndoEffect::Deleted => u.before.is_some() && u.after.is_none(),
                    UndoEffect::Reverted => u.before.is_some() && u.after.is_some(),
                    UndoEffect::Restored => u.before.is_none() && u.after.is_some(),
                };
                if !shape_ok {
                    return Err(CoreError::InvalidData(format!(
                        "card.undone with effect '{}' has mismatched before/after",
                        u.effect.as_str()
                    )));
                }
                if u.reverted_type.entity_type() != EntityType::Card
                    || u.reverted_type == ActivityType::CardUndone
                {
                    return Err(CoreError::InvalidData(format!(
                        "card.undone cannot revert '{}'",
                        u.reverted_type
                    )));
                }
                for snapshot in u.before.iter().chain(u.after.iter()) {
                    check_position(snapshot.position)?;
                }
                Ok(())
            }
            Self::BoardCreated(_)
            | Self::BoardRenamed(_)
            | Self::BoardDeleted(_)
            | Self::ListRenamed(_)
            | Self::CardUpdated(_)
            | Self::ActivityCleared(_) => Ok(()),
        }
    }

    /// Split into the `event_type` tag and the `data` body for storage.
    pub fn encode(&self) -> Result<(ActivityType, serde_json::Value), CoreError> {
        self.validate()?;
        let mut tagged = serde_json::to_value(self)
            .map_err(|e| CoreError::Internal(format!("failed to encode activity payload: {e}")))?;
        let data = tagged
            .get_mut("data")
            .map(serde_json::Value::take)
            .ok_or_else(|| CoreError::Internal("encoded activity payload has no data".into()))?;
        Ok((self.activity_type(), data))
    }

    /// Rebuild a payload from its stored `event_type` tag and `data` body.
    ///
    /// Fails with [`CoreError::InvalidData`] when the tag is unknown, the body
    /// does not match the shape for that tag, or validation fails.
    pub fn decode(event_type: &str, data: serde_json::Value) -> Result<Self, CoreError> {
        let activity_type: ActivityType = event_type.parse()?;
        let tagged = serde_json::json!({ "type": activity_type.as_str(), "data": data });
        let payload: Self = serde_json::from_value(tagged).map_err(|e| {
            CoreError::InvalidData(format!("malformed {activity_type} payload: {e}"))
        })?;
        payload.validate()?;
        Ok(payload)
    }
}

fn check_position(position: f64) -> Result<(), CoreError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidData(format!(
            "position {position} is not a finite number"
        )))
    }
}
