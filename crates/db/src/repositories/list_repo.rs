//! Repository for the `lists` table.

use pinboard_core::activity::{ActivityPayload, Change, ListDeleted};
use pinboard_core::actor::Actor;
use pinboard_core::error::CoreError;
use pinboard_core::position::position_after;
use pinboard_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::activity::NewActivity;
use crate::models::list::{DeletedList, List};
use crate::repositories::{ActivityRepo, BoardRepo};

/// Column list for lists queries.
const COLUMNS: &str = "id, board_id, title, position, created_at, updated_at";

/// Provides CRUD operations for lists.
pub struct ListRepo;

impl ListRepo {
    /// Find a list by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Append a list to the end of a board and log `list.created`.
    pub async fn create(
        pool: &PgPool,
        board_id: DbId,
        title: &str,
        actor: &Actor,
    ) -> StoreResult<List> {
        let mut tx = pool.begin().await?;

        if !BoardRepo::exists(&mut tx, board_id).await? {
            return Err(CoreError::NotFound {
                entity: "Board",
                id: board_id,
            }
            .into());
        }

        let last = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT MAX(position) FROM lists WHERE board_id = $1",
        )
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;

        let list = Self::insert(&mut tx, board_id, title, position_after(last)).await?;
        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board_id,
                list.id,
                actor,
                ActivityPayload::ListCreated(Change::created(list.snapshot())),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id, list_id = list.id, position = list.position, "List created");
        Ok(list)
    }

    /// Rename a list on `board_id` and log `list.renamed`.
    pub async fn rename(
        pool: &PgPool,
        board_id: DbId,
        list_id: DbId,
        title: &str,
        actor: &Actor,
    ) -> StoreResult<List> {
        let mut tx = pool.begin().await?;

        let before = Self::lock_on_board(&mut tx, board_id, list_id).await?;

        let query = format!(
            "UPDATE lists SET title = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let list = sqlx::query_as::<_, List>(&query)
            .bind(list_id)
            .bind(title)
            .fetch_one(&mut *tx)
            .await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board_id,
                list_id,
                actor,
                ActivityPayload::ListRenamed(Change::new(
                    before.title_snapshot(),
                    list.title_snapshot(),
                )),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id, list_id, title = %list.title, "List renamed");
        Ok(list)
    }

    /// Delete a list and its cards, logging a single `list.deleted` that
    /// records how many cards went with it.
    pub async fn delete(
        pool: &PgPool,
        board_id: DbId,
        list_id: DbId,
        actor: &Actor,
    ) -> StoreResult<DeletedList> {
        let mut tx = pool.begin().await?;

        let before = Self::lock_on_board(&mut tx, board_id, list_id).await?;

        let card_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cards WHERE list_id = $1",
        )
        .bind(list_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board_id,
                list_id,
                actor,
                ActivityPayload::ListDeleted(ListDeleted {
                    before: before.snapshot(),
                    after: (),
                    card_count,
                }),
            ),
        )
        .await?;
        BoardRepo::touch(&mut tx, board_id).await?;

        tx.commit().await?;
        tracing::info!(board_id, list_id, card_count, "List deleted");
        Ok(DeletedList {
            list_id,
            board_id,
            card_count,
        })
    }

    /// Insert a list row at an explicit position.
    pub(crate) async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        board_id: DbId,
        title: &str,
        position: f64,
    ) -> Result<List, sqlx::Error> {
        let query = format!(
            "INSERT INTO lists (board_id, title, position)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(board_id)
            .bind(title)
            .bind(position)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a list inside an open transaction, taking a share lock so it
    /// cannot be deleted before the transaction ends.
    pub(crate) async fn find_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List a board's lists in display order.
    pub(crate) async fn list_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        board_id: DbId,
    ) -> Result<Vec<List>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lists
             WHERE board_id = $1
             ORDER BY position, id"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(board_id)
            .fetch_all(&mut **tx)
            .await
    }

    /// Row-lock a list that must belong to `board_id`.
    async fn lock_on_board(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        board_id: DbId,
        list_id: DbId,
    ) -> StoreResult<List> {
        let query = format!(
            "SELECT {COLUMNS} FROM lists
             WHERE id = $1 AND board_id = $2
             FOR UPDATE"
        );
        let list = sqlx::query_as::<_, List>(&query)
            .bind(list_id)
            .bind(board_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "List",
                id: list_id,
            })?;
        Ok(list)
    }
}
