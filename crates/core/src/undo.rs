//! Undo planning.
//!
//! Turns a logged activity event into the inverse mutation to apply. The
//! plan is derived only from the event's own snapshots, never from live
//! state; the persistence layer executes it inside one transaction.

use crate::activity::{
    ActivityPayload, CardFields, CardPlacement, CardSnapshot, EntityType, UndoEffect,
};
use crate::card::CardPatch;
use crate::error::CoreError;
use crate::types::DbId;

/// The inverse mutation for one activity event.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoPlan {
    /// Undo of `card.created`.
    DeleteCard { card_id: DbId },
    /// Undo of `card.moved` / `card.updated`.
    RevertCard { card_id: DbId, revert: CardRevert },
    /// Undo of `card.deleted`.
    RestoreCard { snapshot: CardSnapshot },
}

impl UndoPlan {
    pub fn card_id(&self) -> DbId {
        match self {
            Self::DeleteCard { card_id } | Self::RevertCard { card_id, .. } => *card_id,
            Self::RestoreCard { snapshot } => snapshot.id,
        }
    }

    pub fn effect(&self) -> UndoEffect {
        match self {
            Self::DeleteCard { .. } => UndoEffect::Deleted,
            Self::RevertCard { .. } => UndoEffect::Reverted,
            Self::RestoreCard { .. } => UndoEffect::Restored,
        }
    }
}

/// The logged `before` snapshot to write back onto the current card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardRevert {
    Placement(CardPlacement),
    Fields(CardFields),
}

impl CardRevert {
    /// The card state after the revert. Only the fields carried by the
    /// snapshot change; everything else keeps its current value, so
    /// concurrent edits to other fields survive.
    pub fn apply_to(&self, current: &CardSnapshot) -> CardSnapshot {
        let mut next = current.clone();
        match self {
            Self::Placement(placement) => {
                next.list_id = placement.list_id;
                next.position = placement.position;
            }
            Self::Fields(fields) => {
                let fields = CardPatch::from(fields.clone()).apply(&current.fields());
                next.title = fields.title;
                next.description = fields.description;
                next.due_at = fields.due_at;
            }
        }
        next
    }
}

/// Derive the inverse of an event.
///
/// Only card events are undoable; `entity_id` must match the card the
/// payload describes.
pub fn plan_undo(
    entity_type: EntityType,
    entity_id: DbId,
    payload: &ActivityPayload,
) -> Result<UndoPlan, CoreError> {
    if entity_type != EntityType::Card {
        return Err(CoreError::Unsupported(format!(
            "only card events can be undone, got a {entity_type} event"
        )));
    }

    let plan = match payload {
        ActivityPayload::CardCreated(change) => {
            check_card_id(entity_id, change.after.id)?;
            UndoPlan::DeleteCard { card_id: entity_id }
        }
        ActivityPayload::CardMoved(change) => UndoPlan::RevertCard {
            card_id: entity_id,
            revert: CardRevert::Placement(change.before),
        },
        ActivityPayload::CardUpdated(change) => UndoPlan::RevertCard {
            card_id: entity_id,
            revert: CardRevert::Fields(change.before.clone()),
        },
        ActivityPayload::CardDeleted(change) => {
            check_card_id(entity_id, change.before.id)?;
            UndoPlan::RestoreCard {
                snapshot: change.before.clone(),
            }
        }
        other => {
            return Err(CoreError::Unsupported(format!(
                "events of type '{}' cannot be undone",
                other.activity_type()
            )))
        }
    };
    Ok(plan)
}

fn check_card_id(entity_id: DbId, snapshot_id: DbId) -> Result<(), CoreError> {
    if entity_id == snapshot_id {
        Ok(())
    } else {
        Err(CoreError::InvalidData(format!(
            "event for card {entity_id} carries a snapshot of card {snapshot_id}"
        )))
    }
}
