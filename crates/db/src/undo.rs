//! Undo engine.
//!
//! Applies the inverse of a logged card event exactly once. The event row is
//! locked for the whole transaction so racing undos of the same event queue
//! up behind each other; the second one then finds the `card.undone` entry
//! written by the first and reports [`UndoOutcome::AlreadyUndone`].

use pinboard_core::activity::{ActivityPayload, CardUndone, UndoEffect};
use pinboard_core::actor::Actor;
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use pinboard_core::undo::{plan_undo, CardRevert, UndoPlan};
use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};
use crate::models::activity::{ActivityEvent, NewActivity};
use crate::models::card::Card;
use crate::repositories::{ActivityRepo, BoardRepo, CardRepo, ListRepo};

/// Unique constraint that allows at most one undo per event.
const UNDO_ONCE_CONSTRAINT: &str = "uq_activity_events_reverted_event_id";

/// Result of an undo request.
#[derive(Debug, Clone)]
pub enum UndoOutcome {
    /// The inverse was applied and logged as `event`.
    Undone {
        effect: UndoEffect,
        board_id: DbId,
        card_id: DbId,
        /// The card after the undo; `None` when the undo deleted it.
        card: Option<Card>,
        event: ActivityEvent,
    },
    /// The event had already been undone. Nothing changed.
    AlreadyUndone { event_id: DbId },
}

/// Executes undo plans against the store.
pub struct UndoEngine;

impl UndoEngine {
    /// Undo the activity event `event_id` on behalf of `actor`.
    pub async fn undo(pool: &PgPool, event_id: DbId, actor: &Actor) -> StoreResult<UndoOutcome> {
        match Self::undo_in_tx(pool, event_id, actor).await {
            Err(StoreError::Database(sqlx::Error::Database(db_err)))
                if db_err.constraint() == Some(UNDO_ONCE_CONSTRAINT) =>
            {
                tracing::debug!(event_id, "Concurrent undo lost the race");
                Ok(UndoOutcome::AlreadyUndone { event_id })
            }
            other => other,
        }
    }

    async fn undo_in_tx(pool: &PgPool, event_id: DbId, actor: &Actor) -> StoreResult<UndoOutcome> {
        let mut tx = pool.begin().await?;

        let event = ActivityRepo::lock(&mut tx, event_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ActivityEvent",
                id: event_id,
            })?;

        if ActivityRepo::find_undo_of(&mut tx, event_id).await?.is_some() {
            return Ok(UndoOutcome::AlreadyUndone { event_id });
        }

        let plan = plan_undo(event.entity_type, event.entity_id, &event.payload)?;
        let card_id = plan.card_id();
        let effect = plan.effect();

        let (before, after) = match plan {
            UndoPlan::DeleteCard { card_id } => {
                let card = CardRepo::lock(&mut tx, card_id).await?.ok_or(CoreError::NotFound {
                    entity: "Card",
                    id: card_id,
                })?;
                CardRepo::delete_in_tx(&mut tx, card_id).await?;
                (Some(card), None)
            }
            UndoPlan::RevertCard { card_id, revert } => {
                let current = CardRepo::lock(&mut tx, card_id).await?.ok_or(CoreError::NotFound {
                    entity: "Card",
                    id: card_id,
                })?;
                if let CardRevert::Placement(placement) = &revert {
                    require_list_for_undo(&mut tx, placement.list_id, current.board_id).await?;
                }
                let target = revert.apply_to(&current.snapshot());
                let reverted = CardRepo::overwrite(&mut tx, &target).await?;
                (Some(current), Some(reverted))
            }
            UndoPlan::RestoreCard { snapshot } => {
                if snapshot.board_id != event.board_id {
                    return Err(CoreError::Unsupported(format!(
                        "card {} was logged on board {} but the event belongs to board {}",
                        snapshot.id, snapshot.board_id, event.board_id
                    ))
                    .into());
                }
                require_list_for_undo(&mut tx, snapshot.list_id, snapshot.board_id).await?;
                match CardRepo::insert_snapshot(&mut tx, &snapshot).await? {
                    Some(card) => (None, Some(card)),
                    None => return Ok(UndoOutcome::AlreadyUndone { event_id }),
                }
            }
        };

        let board_id = event.board_id;
        let logged = ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board_id,
                card_id,
                actor,
                ActivityPayload::CardUndone(CardUndone {
                    reverted_event_id: event_id,
                    reverted_type: event.activity_type(),
                    effect,
                    before: before.as_ref().map(Card::snapshot),
                    after: after.as_ref().map(Card::snapshot),
                }),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, board_id).await?;

        tx.commit().await?;
        tracing::info!(
            board_id,
            card_id,
            event_id,
            undo_event_id = logged.id,
            effect = effect.as_str(),
            "Activity event undone"
        );

        Ok(UndoOutcome::Undone {
            effect,
            board_id,
            card_id,
            card: after,
            event: logged,
        })
    }
}

/// A card can only be put back into a list that still exists on its board.
async fn require_list_for_undo(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    list_id: DbId,
    board_id: DbId,
) -> StoreResult<()> {
    match ListRepo::find_in_tx(tx, list_id).await? {
        Some(list) if list.board_id == board_id => Ok(()),
        Some(_) => Err(CoreError::Unsupported(format!(
            "list {list_id} no longer belongs to board {board_id}"
        ))
        .into()),
        None => Err(CoreError::Unsupported(format!("list {list_id} no longer exists")).into()),
    }
}
