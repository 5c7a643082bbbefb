use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, Stream, StreamExt};
use pinboard_core::error::CoreError;
use pinboard_core::types::DbId;
use pinboard_db::repositories::BoardRepo;
use pinboard_events::{BoardSignal, SubscriberError};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::keepalive::spawn_keepalive;

/// GET /api/v1/boards/{id}/ws
///
/// Upgrades to a WebSocket that receives every signal published for the
/// board as a JSON text frame. Unknown boards are rejected before the
/// upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    BoardRepo::find_by_id(&state.pool, board_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Board",
            id: board_id,
        }))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, board_id)))
}

/// Manage a single board connection after upgrade.
///
///   1. Registers the connection with `WsManager`.
///   2. Subscribes to the board; each signal is queued on the connection's
///      channel.
///   3. Spawns a sender task that forwards the channel to the sink, and a
///      keep-alive task, both tied to one cancellation token.
///   4. Processes inbound frames on the current task until the client
///      closes or the sender stops, then tears everything down together.
async fn handle_socket(socket: WebSocket, state: AppState, board_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, board_id, "WebSocket connected");

    let (tx, mut rx) = state.ws_manager.add(conn_id.clone(), board_id).await;
    let cancel = CancellationToken::new();

    let signal_tx = tx.clone();
    let mut subscription = state.notifier.subscribe(board_id, move |signal: &BoardSignal| {
        let text = serde_json::to_string(signal)
            .map_err(|e| SubscriberError(format!("encode failed: {e}")))?;
        signal_tx
            .send(Message::Text(text.into()))
            .map_err(|_| SubscriberError("connection closed".into()))
    });

    let keepalive = spawn_keepalive(
        tx,
        Duration::from_secs(state.config.ws_keepalive_secs),
        cancel.clone(),
    );

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_cancel = cancel.clone();
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                () = sender_cancel.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
        // Wake the receiver loop if the sink went away first.
        sender_cancel.cancel();
    });

    receive_until_closed(&conn_id, &mut stream, &cancel).await;

    // Teardown: stop the timer and forwarder, drop the subscription, forget
    // the connection.
    cancel.cancel();
    subscription.unsubscribe();
    state.ws_manager.remove(&conn_id).await;
    let _ = keepalive.await;
    let _ = send_task.await;
    tracing::info!(conn_id = %conn_id, board_id, "WebSocket disconnected");
}

/// Drain inbound control frames until the client goes away or `cancel`
/// fires.
async fn receive_until_closed<S>(conn_id: &str, stream: &mut S, cancel: &CancellationToken)
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(conn_id = %conn_id, "Sender stopped, closing receiver");
                return;
            }
            next = stream.next() => match next {
                Some(result) => result,
                None => return,
            },
        };
        match result {
            Ok(Message::Close(_)) => return,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                return;
            }
        }
    }
}
