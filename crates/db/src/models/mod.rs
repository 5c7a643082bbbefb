//! Row types and request DTOs.

pub mod activity;
pub mod board;
pub mod card;
pub mod label;
pub mod list;
