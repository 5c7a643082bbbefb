//! Repository for the `activity_events` table.
//!
//! Appends happen only inside a caller's transaction; there is no update or
//! delete. Reads decode and validate each row into an [`ActivityEvent`].

use pinboard_core::activity::{ActivityPayload, ActivityType, Change};
use pinboard_core::actor::Actor;
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::activity::{ActivityEvent, ActivityEventRow, NewActivity};
use crate::repositories::BoardRepo;

/// Column list for `activity_events` SELECT / RETURNING clauses.
const COLUMNS: &str = "\
    id, board_id, entity_type, entity_id, event_type, \
    actor_user_id, actor_name, actor_client_id, data, created_at";

/// Provides append and query operations for the activity log.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append one event within an existing transaction.
    ///
    /// The payload is validated and encoded here, so a malformed payload
    /// aborts the surrounding mutation.
    pub async fn append(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event: NewActivity<'_>,
    ) -> StoreResult<ActivityEvent> {
        let (event_type, data) = event.payload.encode()?;
        let query = format!(
            "INSERT INTO activity_events \
                (board_id, entity_type, entity_id, event_type, actor_user_id, \
                 actor_name, actor_client_id, data, reverted_event_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ActivityEventRow>(&query)
            .bind(event.board_id)
            .bind(event.payload.entity_type().as_str())
            .bind(event.entity_id)
            .bind(event_type.as_str())
            .bind(event.actor.user_id)
            .bind(&event.actor.name)
            .bind(&event.actor.client_id)
            .bind(&data)
            .bind(event.payload.reverted_event_id())
            .fetch_one(&mut **tx)
            .await?;

        tracing::debug!(
            event_id = row.id,
            board_id = row.board_id,
            event_type = %event_type,
            "Activity event appended"
        );
        Ok(ActivityEvent::try_from(row)?)
    }

    /// Find an event by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> StoreResult<Option<ActivityEvent>> {
        let query = format!("SELECT {COLUMNS} FROM activity_events WHERE id = $1");
        let row = sqlx::query_as::<_, ActivityEventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(ActivityEvent::try_from).transpose()?)
    }

    /// Find and row-lock an event within a transaction.
    pub(crate) async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> StoreResult<Option<ActivityEvent>> {
        let query = format!("SELECT {COLUMNS} FROM activity_events WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, ActivityEventRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(ActivityEvent::try_from).transpose()?)
    }

    /// Id of the `card.undone` event that reverted `event_id`, if any.
    pub(crate) async fn find_undo_of(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM activity_events \
             WHERE event_type = $1 AND reverted_event_id = $2",
        )
        .bind(ActivityType::CardUndone.as_str())
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// List a board's events, newest first.
    ///
    /// When `viewer_client_id` is given, events at or before that viewer's
    /// latest `activity.cleared` marker (by `(created_at, id)`) are hidden.
    /// Markers themselves are never returned. `limit` must already be
    /// clamped by the caller.
    pub async fn list_for_board(
        pool: &PgPool,
        board_id: DbId,
        viewer_client_id: Option<&str>,
        limit: i64,
    ) -> StoreResult<Vec<ActivityEvent>> {
        let query = format!(
            "WITH marker AS ( \
                SELECT created_at, id FROM activity_events \
                WHERE board_id = $1 AND event_type = $2 AND actor_client_id = $3 \
                ORDER BY created_at DESC, id DESC \
                LIMIT 1 \
             ) \
             SELECT {COLUMNS} FROM activity_events e \
             WHERE e.board_id = $1 \
               AND e.event_type <> $2 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM marker m \
                   WHERE (e.created_at, e.id) <= (m.created_at, m.id) \
               ) \
             ORDER BY e.created_at DESC, e.id DESC \
             LIMIT $4"
        );
        let rows = sqlx::query_as::<_, ActivityEventRow>(&query)
            .bind(board_id)
            .bind(ActivityType::ActivityCleared.as_str())
            .bind(viewer_client_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        rows.into_iter()
            .map(|row| ActivityEvent::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Append an `activity.cleared` marker for `actor` on a board.
    ///
    /// Nothing is deleted: later listings for the same client id simply
    /// start after this marker.
    pub async fn clear(pool: &PgPool, board_id: DbId, actor: &Actor) -> StoreResult<ActivityEvent> {
        let mut tx = pool.begin().await?;

        if !BoardRepo::exists(&mut tx, board_id).await? {
            return Err(CoreError::NotFound {
                entity: "Board",
                id: board_id,
            }
            .into());
        }

        let marker = Self::append(
            &mut tx,
            NewActivity::new(
                board_id,
                board_id,
                actor,
                ActivityPayload::ActivityCleared(Change::new((), ())),
            ),
        )
        .await?;

        tx.commit().await?;
        tracing::info!(
            board_id,
            event_id = marker.id,
            client_id = %actor.client_id,
            "Activity cleared for viewer"
        );
        Ok(marker)
    }
}
