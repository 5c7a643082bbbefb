//! Pinboard domain core.
//!
//! Pure building blocks shared by the persistence and HTTP layers: id and
//! timestamp types, the domain error, fractional positions, actors, the
//! typed activity payloads and the undo planner. Nothing here performs I/O.

pub mod activity;
pub mod actor;
pub mod board;
pub mod card;
pub mod error;
pub mod position;
pub mod types;
pub mod undo;
