use pinboard_core::error::CoreError;

/// Error returned by store and undo operations.
///
/// Domain failures (not found, conflict, ...) are raised inside the
/// transaction as [`CoreError`]; returning early drops the transaction, which
/// rolls back the mutation together with its activity event.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
