//! Repository for the `cards` table.

use pinboard_core::activity::{ActivityPayload, CardSnapshot, Change};
use pinboard_core::actor::Actor;
use pinboard_core::card::CardPatch;
use pinboard_core::error::CoreError;
use pinboard_core::position::{position_after, position_between};
use pinboard_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::activity::NewActivity;
use crate::models::card::{Card, CreateCardRequest, DeletedCard, MoveCardRequest};
use crate::models::list::List;
use crate::repositories::{ActivityRepo, BoardRepo, ListRepo};

/// Column list for cards queries.
const COLUMNS: &str = "id, board_id, list_id, title, description, due_at, \
    position, created_at, updated_at";

/// Provides CRUD and move operations for cards.
pub struct CardRepo;

impl CardRepo {
    /// Find a card by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards WHERE id = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Append a card to the end of a list and log `card.created`.
    ///
    /// The list must belong to `board_id`. `input.title` is expected to be
    /// trimmed and non-empty already.
    pub async fn create(
        pool: &PgPool,
        board_id: DbId,
        list_id: DbId,
        input: &CreateCardRequest,
        actor: &Actor,
    ) -> StoreResult<Card> {
        let mut tx = pool.begin().await?;

        require_list_on_board(&mut tx, list_id, board_id).await?;
        let position = position_after(Self::last_position(&mut tx, list_id, None).await?);

        let query = format!(
            "INSERT INTO cards (board_id, list_id, title, description, due_at, position)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let card = sqlx::query_as::<_, Card>(&query)
            .bind(board_id)
            .bind(list_id)
            .bind(&input.title)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.due_at)
            .bind(position)
            .fetch_one(&mut *tx)
            .await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board_id,
                card.id,
                actor,
                ActivityPayload::CardCreated(Change::created(card.snapshot())),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id, list_id, card_id = card.id, "Card created");
        Ok(card)
    }

    /// Apply a partial edit and log `card.updated` with the editable fields
    /// before and after.
    pub async fn update(
        pool: &PgPool,
        card_id: DbId,
        patch: &CardPatch,
        actor: &Actor,
    ) -> StoreResult<Card> {
        if patch.is_empty() {
            return Err(CoreError::Validation(
                "at least one of title, description or dueAt is required".into(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let before = Self::lock(&mut tx, card_id).await?.ok_or(CoreError::NotFound {
            entity: "Card",
            id: card_id,
        })?;
        let mut next = before.snapshot();
        let fields = patch.apply(&before.fields());
        next.title = fields.title;
        next.description = fields.description;
        next.due_at = fields.due_at;
        let card = Self::overwrite(&mut tx, &next).await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                card.board_id,
                card_id,
                actor,
                ActivityPayload::CardUpdated(Change::new(before.fields(), card.fields())),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, card.board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id = card.board_id, card_id, "Card updated");
        Ok(card)
    }

    /// Move a card into `to_list_id`, between the given neighbours, and log
    /// `card.moved` with the placement before and after.
    ///
    /// Neighbour positions are read without locking; a concurrent move of a
    /// neighbour can leave the card slightly out of the intended slot.
    pub async fn move_card(
        pool: &PgPool,
        card_id: DbId,
        input: &MoveCardRequest,
        actor: &Actor,
    ) -> StoreResult<Card> {
        let mut tx = pool.begin().await?;

        let before = Self::lock(&mut tx, card_id).await?.ok_or(CoreError::NotFound {
            entity: "Card",
            id: card_id,
        })?;
        require_list_on_board(&mut tx, input.to_list_id, before.board_id).await?;

        let prev = Self::neighbour(&mut tx, input.before_card_id, &before, input.to_list_id).await?;
        let next = Self::neighbour(&mut tx, input.after_card_id, &before, input.to_list_id).await?;
        let position = match (prev, next) {
            (None, None) => position_after(
                Self::last_position(&mut tx, input.to_list_id, Some(card_id)).await?,
            ),
            (prev, next) => position_between(prev, next),
        };

        let mut target = before.snapshot();
        target.list_id = input.to_list_id;
        target.position = position;
        let card = Self::overwrite(&mut tx, &target).await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                card.board_id,
                card_id,
                actor,
                ActivityPayload::CardMoved(Change::new(before.placement(), card.placement())),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, card.board_id).await?;

        tx.commit().await?;
        tracing::info!(
            board_id = card.board_id,
            card_id,
            from_list = before.list_id,
            to_list = card.list_id,
            position,
            "Card moved"
        );
        Ok(card)
    }

    /// Delete a card and log `card.deleted` with its full snapshot.
    pub async fn delete(pool: &PgPool, card_id: DbId, actor: &Actor) -> StoreResult<DeletedCard> {
        let mut tx = pool.begin().await?;

        let before = Self::lock(&mut tx, card_id).await?.ok_or(CoreError::NotFound {
            entity: "Card",
            id: card_id,
        })?;
        Self::delete_in_tx(&mut tx, card_id).await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                before.board_id,
                card_id,
                actor,
                ActivityPayload::CardDeleted(Change::deleted(before.snapshot())),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, before.board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id = before.board_id, card_id, "Card deleted");
        Ok(DeletedCard {
            card_id,
            board_id: before.board_id,
        })
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Find and row-lock a card.
    pub(crate) async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a card with an explicit id. Returns `None` if a card with that
    /// id already exists.
    pub(crate) async fn insert_snapshot(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        snapshot: &CardSnapshot,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!(
            "INSERT INTO cards (id, board_id, list_id, title, description, due_at, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(snapshot.id)
            .bind(snapshot.board_id)
            .bind(snapshot.list_id)
            .bind(&snapshot.title)
            .bind(&snapshot.description)
            .bind(snapshot.due_at)
            .bind(snapshot.position)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write the mutable columns of `snapshot` onto the existing card.
    pub(crate) async fn overwrite(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        snapshot: &CardSnapshot,
    ) -> Result<Card, sqlx::Error> {
        let query = format!(
            "UPDATE cards SET
                list_id = $2,
                title = $3,
                description = $4,
                due_at = $5,
                position = $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(snapshot.id)
            .bind(snapshot.list_id)
            .bind(&snapshot.title)
            .bind(&snapshot.description)
            .bind(snapshot.due_at)
            .bind(snapshot.position)
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a card row. Returns `false` if it was already gone.
    pub(crate) async fn delete_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a board's cards grouped by list, each list in display order.
    pub(crate) async fn list_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        board_id: DbId,
    ) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE board_id = $1
             ORDER BY list_id, position, id"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(board_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Highest position in a list, optionally ignoring one card.
    async fn last_position(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        list_id: DbId,
        excluding: Option<DbId>,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT MAX(position) FROM cards
             WHERE list_id = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(list_id)
        .bind(excluding)
        .fetch_one(&mut **tx)
        .await
    }

    /// Resolve a move neighbour to its position. A neighbour that no longer
    /// exists resolves to `None`.
    async fn neighbour(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        neighbour_id: Option<DbId>,
        moving: &Card,
        to_list_id: DbId,
    ) -> StoreResult<Option<f64>> {
        let Some(id) = neighbour_id else {
            return Ok(None);
        };
        if id == moving.id {
            return Err(CoreError::Conflict(format!(
                "card {id} cannot be positioned relative to itself"
            ))
            .into());
        }

        let query = format!("SELECT {COLUMNS} FROM cards WHERE id = $1");
        let Some(neighbour) = sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
        else {
            // Deleted by someone else since the client last fetched.
            tracing::debug!(card_id = moving.id, neighbour_id = id, "Move neighbour gone, ignoring it");
            return Ok(None);
        };

        if neighbour.list_id != to_list_id {
            return Err(CoreError::Conflict(format!(
                "card {id} is in list {}, not in target list {to_list_id}",
                neighbour.list_id
            ))
            .into());
        }
        Ok(Some(neighbour.position))
    }
}

/// Ensure a list exists and belongs to `board_id`. A list on another board
/// is reported as not found.
async fn require_list_on_board(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    list_id: DbId,
    board_id: DbId,
) -> StoreResult<List> {
    match ListRepo::find_in_tx(tx, list_id).await? {
        Some(list) if list.board_id == board_id => Ok(list),
        _ => Err(CoreError::NotFound {
            entity: "List",
            id: list_id,
        }
        .into()),
    }
}
