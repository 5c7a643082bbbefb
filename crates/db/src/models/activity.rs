//! Activity event model.

use pinboard_core::activity::{ActivityPayload, ActivityType, EntityType};
use pinboard_core::actor::Actor;
use pinboard_core::error::CoreError;
use pinboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A raw row from the `activity_events` table, before payload validation.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEventRow {
    pub id: DbId,
    pub board_id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub event_type: String,
    pub actor_user_id: Option<DbId>,
    pub actor_name: String,
    pub actor_client_id: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
}

/// A validated activity event.
///
/// Serializes flat, with the payload contributing `type` and `data`:
/// `{id, boardId, entityType, entityId, type, data, actorUserId, actorName,
/// actorClientId, createdAt}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: DbId,
    pub board_id: DbId,
    pub entity_type: EntityType,
    pub entity_id: DbId,
    #[serde(flatten)]
    pub payload: ActivityPayload,
    pub actor_user_id: Option<DbId>,
    pub actor_name: String,
    pub actor_client_id: String,
    pub created_at: Timestamp,
}

impl ActivityEvent {
    pub fn activity_type(&self) -> ActivityType {
        self.payload.activity_type()
    }
}

impl TryFrom<ActivityEventRow> for ActivityEvent {
    type Error = CoreError;

    fn try_from(row: ActivityEventRow) -> Result<Self, Self::Error> {
        let entity_type: EntityType = row.entity_type.parse()?;
        let payload = ActivityPayload::decode(&row.event_type, row.data)?;
        if payload.entity_type() != entity_type {
            return Err(CoreError::InvalidData(format!(
                "activity event {} is a {} event stored against a {entity_type}",
                row.id,
                payload.activity_type()
            )));
        }
        Ok(Self {
            id: row.id,
            board_id: row.board_id,
            entity_type,
            entity_id: row.entity_id,
            payload,
            actor_user_id: row.actor_user_id,
            actor_name: row.actor_name,
            actor_client_id: row.actor_client_id,
            created_at: row.created_at,
        })
    }
}

/// An event about to be appended.
#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub board_id: DbId,
    pub entity_id: DbId,
    pub actor: &'a Actor,
    pub payload: ActivityPayload,
}

impl<'a> NewActivity<'a> {
    pub fn new(board_id: DbId, entity_id: DbId, actor: &'a Actor, payload: ActivityPayload) -> Self {
        Self {
            board_id,
            entity_id,
            actor,
            payload,
        }
    }
}

/// Query parameters for an activity listing (`?limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}
