//! WebSocket infrastructure for board realtime updates.
//!
//! Provides connection tracking, the per-connection keep-alive, and the HTTP
//! upgrade handler mounted at `/boards/{id}/ws`.

mod handler;
mod keepalive;
pub mod manager;

pub use handler::ws_handler;
pub use keepalive::spawn_keepalive;
pub use manager::WsManager;
