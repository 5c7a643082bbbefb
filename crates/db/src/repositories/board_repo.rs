//! Repository for the `boards` table.

use pinboard_core::activity::{ActivityPayload, Change};
use pinboard_core::actor::Actor;
use pinboard_core::board::DEFAULT_LIST_TITLES;
use pinboard_core::error::CoreError;
use pinboard_core::position::position_after;
use pinboard_core::types::DbId;
use sqlx::PgPool;

use crate::error::StoreResult;
use crate::models::activity::NewActivity;
use crate::models::board::{Board, BoardState, CreatedBoard};
use crate::repositories::{ActivityRepo, CardRepo, LabelRepo, ListRepo};

/// Column list for boards queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// List all boards, most recently touched first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards ORDER BY updated_at DESC, id DESC");
        sqlx::query_as::<_, Board>(&query).fetch_all(pool).await
    }

    /// Find a board by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a board together with its default lists.
    ///
    /// `name` must already be resolved (see
    /// [`pinboard_core::board::resolve_board_name`]). Logs `board.created`
    /// followed by one `list.created` per default list.
    pub async fn create_with_defaults(
        pool: &PgPool,
        name: &str,
        actor: &Actor,
    ) -> StoreResult<CreatedBoard> {
        let mut tx = pool.begin().await?;

        let query = format!("INSERT INTO boards (name) VALUES ($1) RETURNING {COLUMNS}");
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                board.id,
                board.id,
                actor,
                ActivityPayload::BoardCreated(Change::created(board.snapshot())),
            ),
        )
        .await?;

        let mut lists = Vec::with_capacity(DEFAULT_LIST_TITLES.len());
        let mut last = None;
        for title in DEFAULT_LIST_TITLES {
            let position = position_after(last);
            let list = ListRepo::insert(&mut tx, board.id, title, position).await?;
            ActivityRepo::append(
                &mut tx,
                NewActivity::new(
                    board.id,
                    list.id,
                    actor,
                    ActivityPayload::ListCreated(Change::created(list.snapshot())),
                ),
            )
            .await?;
            last = Some(position);
            lists.push(list);
        }

        tx.commit().await?;
        tracing::info!(board_id = board.id, name = %board.name, "Board created");
        Ok(CreatedBoard { board, lists })
    }

    /// Rename a board and log `board.renamed`.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: &str,
        actor: &Actor,
    ) -> StoreResult<Board> {
        let mut tx = pool.begin().await?;

        let before = Self::lock(&mut tx, id).await?.ok_or(CoreError::NotFound {
            entity: "Board",
            id,
        })?;

        let query = format!(
            "UPDATE boards SET name = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        ActivityRepo::append(
            &mut tx,
            NewActivity::new(
                id,
                id,
                actor,
                ActivityPayload::BoardRenamed(Change::new(
                    before.name_snapshot(),
                    board.name_snapshot(),
                )),
            ),
        )
        .await?;

        tx.commit().await?;
        tracing::info!(board_id = id, from = %before.name, to = %board.name, "Board renamed");
        Ok(board)
    }

    /// Delete a board. Lists, cards, labels and the board's whole activity
    /// history go with it, so no event is recorded.
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Board",
                id,
            }
            .into());
        }
        tracing::info!(board_id = id, "Board deleted");
        Ok(())
    }

    /// Load a board with its lists, cards and labels from one consistent
    /// snapshot.
    pub async fn state(pool: &PgPool, id: DbId) -> StoreResult<BoardState> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1");
        let board = sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Board",
                id,
            })?;

        let lists = ListRepo::list_in_tx(&mut tx, id).await?;
        let cards = CardRepo::list_in_tx(&mut tx, id).await?;
        let labels = LabelRepo::list_in_tx(&mut tx, id).await?;
        tx.commit().await?;

        Ok(BoardState {
            board,
            lists,
            cards,
            labels,
        })
    }

    /// Whether a board exists. Takes a share lock so the board cannot be
    /// deleted before the caller's transaction ends.
    pub(crate) async fn exists(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, DbId>("SELECT id FROM boards WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.is_some())
    }

    /// Bump a board's `updated_at` after a change to one of its children.
    pub(crate) async fn touch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE boards SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
