//! Request extractors shared by handlers.
//!
//! - [`actor::ActorIdentity`] -- Resolves who is acting from the actor headers.

pub mod actor;
