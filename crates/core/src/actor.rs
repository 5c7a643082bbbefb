//! The identity attributed to a mutation or undo.
//!
//! There is no authentication: an actor is a per-device client id chosen by
//! the browser, a display name, and an optional user id.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Display name used when the client does not send one.
pub const DEFAULT_ACTOR_NAME: &str = "Anonymous";

/// Maximum length (in characters) of a client id.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Maximum length (in characters) of a display name.
pub const MAX_ACTOR_NAME_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Option<DbId>,
    pub name: String,
    pub client_id: String,
}

impl Actor {
    /// Build an actor from raw request values.
    ///
    /// The client id is trimmed and must be non-empty and at most
    /// [`MAX_CLIENT_ID_LEN`] characters. A blank name falls back to
    /// [`DEFAULT_ACTOR_NAME`]; a long one is truncated.
    pub fn new(
        client_id: &str,
        name: Option<&str>,
        user_id: Option<DbId>,
    ) -> Result<Self, CoreError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(CoreError::Validation("client id must not be empty".into()));
        }
        if client_id.chars().count() > MAX_CLIENT_ID_LEN {
            return Err(CoreError::Validation(format!(
                "client id must be at most {MAX_CLIENT_ID_LEN} characters"
            )));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| n.chars().take(MAX_ACTOR_NAME_LEN).collect::<String>())
            .unwrap_or_else(|| DEFAULT_ACTOR_NAME.to_string());

        Ok(Self {
            user_id,
            name,
            client_id: client_id.to_string(),
        })
    }
}
