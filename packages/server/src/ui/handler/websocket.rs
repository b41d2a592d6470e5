//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;

use crate::{
    domain::{ConnectionSession, Handle, SessionMailbox},
    ui::state::AppState,
};

use super::dispatcher::dispatch;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub username: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(username) = query.username else {
        tracing::warn!("Rejecting connection without a username");
        return Err(StatusCode::BAD_REQUEST);
    };

    // Convert String -> Handle (Domain Model)
    let handle = match Handle::try_from(username.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Rejecting connection with invalid username '{}': {}", username, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let max_message_size = state.max_message_size;
    Ok(ws
        .max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, handle)))
}

/// Spawns the send loop: drains the session's outbound queue into the WebSocket.
///
/// Ends when the queue is closed, a write fails, or the session is closed by the
/// registry (replaced by a reconnect or evicted). In the last case a Close frame
/// is sent first.
fn pusher_loop(
    mailbox: SessionMailbox,
    mut sender: SplitSink<WebSocket, Message>,
    handle: Handle,
) -> tokio::task::JoinHandle<()> {
    let SessionMailbox {
        id,
        mut receiver,
        close_signal,
    } = mailbox;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = receiver.recv() => {
                    let Some(frame) = frame else {
                        break;
                    };
                    if let Err(e) = sender.send(Message::Text(frame.into())).await {
                        tracing::error!("Failed to write to '{}' (session {}): {}", handle, id, e);
                        break;
                    }
                }
                _ = close_signal.notified() => {
                    tracing::info!("Closing session {} of '{}'", id, handle);
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, handle: Handle) {
    let (sender, mut receiver) = socket.split();

    // Open the session and start draining its queue before registering it
    let (session, mailbox) = ConnectionSession::open(handle.clone(), state.queue_capacity);
    let session_id = session.id();
    let mut send_task = pusher_loop(mailbox, sender, handle.clone());

    // Use ConnectParticipantUseCase to register the session and announce it
    state.connect_participant_usecase.execute(session).await;

    let state_clone = state.clone();
    let handle_clone = handle.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error from '{}': {}", handle_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received frame from '{}': {}", handle_clone, text.as_str());
                    // 1 フレームの処理が終わるまで次のフレームは読まない
                    dispatch(&state_clone, &handle_clone, text.as_str()).await;
                }
                Message::Binary(_) => {
                    tracing::warn!("Ignoring binary frame from '{}'", handle_clone);
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", handle_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Use DisconnectParticipantUseCase to handle disconnection
    state
        .disconnect_participant_usecase
        .execute(&handle, session_id)
        .await;
}
