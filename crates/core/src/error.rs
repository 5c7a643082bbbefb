use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation is well-formed but cannot be applied to this target
    /// (e.g. undoing a list event, restoring into a vanished list).
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A stored record failed schema validation when read back.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
