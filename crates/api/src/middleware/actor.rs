//! Actor resolution from request headers.
//!
//! Boards are shared without accounts, so every mutation is attributed to the
//! identity the client sends along:
//!
//! | Header         | Required | Meaning                                     |
//! |----------------|----------|---------------------------------------------|
//! | `X-Client-Id`  | yes      | per-device id, 1-128 chars                  |
//! | `X-Actor-Name` | no       | display name, default `Anonymous`, max 80   |
//! | `X-User-Id`    | no       | integer user id when the client has one     |

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use pinboard_core::actor::Actor;
use pinboard_core::types::DbId;

use crate::error::AppError;

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting client, extracted from the actor headers.
///
/// ```ignore
/// async fn my_handler(ActorIdentity(actor): ActorIdentity) -> AppResult<Json<()>> {
///     tracing::info!(client_id = %actor.client_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActorIdentity(pub Actor);

impl<S> FromRequestParts<S> for ActorIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(ActorIdentity)
    }
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let client_id = header_str(headers, CLIENT_ID_HEADER)?
        .ok_or_else(|| AppError::BadRequest("Missing X-Client-Id header".into()))?;
    let name = header_str(headers, ACTOR_NAME_HEADER)?;
    let user_id = header_str(headers, USER_ID_HEADER)?
        .map(|raw| {
            raw.trim()
                .parse::<DbId>()
                .map_err(|_| AppError::BadRequest("X-User-Id must be an integer".into()))
        })
        .transpose()?;

    Ok(Actor::new(client_id, name, user_id)?)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AppError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::BadRequest(format!("{name} header must be valid text")))
        })
        .transpose()
}
