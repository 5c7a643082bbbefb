use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsSender;

/// Spawn a task that sends a Ping frame on `sender` every `interval` until
/// `cancel` fires or the connection's channel closes.
///
/// The first ping goes out one full interval after the call.
pub fn spawn_keepalive(
    sender: WsSender,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).is_err() {
                        break;
                    }
                    tracing::trace!("WebSocket keep-alive ping");
                }
            }
        }
    })
}
