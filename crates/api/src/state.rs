use std::sync::Arc;

use pinboard_events::BoardNotifier;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pinboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Open board WebSocket connections.
    pub ws_manager: Arc<WsManager>,
    /// Per-board realtime fan-out. Handlers publish after each commit.
    pub notifier: Arc<BoardNotifier>,
}
