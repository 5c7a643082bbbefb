//! Repository for the `labels` table.

use pinboard_core::types::DbId;

use crate::models::label::Label;

/// Column list for labels queries.
const COLUMNS: &str = "id, board_id, name, color, created_at";

/// Read access to board labels.
pub struct LabelRepo;

impl LabelRepo {
    /// List a board's labels in creation order.
    pub(crate) async fn list_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        board_id: DbId,
    ) -> Result<Vec<Label>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM labels
             WHERE board_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(board_id)
            .fetch_all(&mut **tx)
            .await
    }
}
