use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    routes::games,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};

/// WebSocket upgrade handler. The peer is the gateway process, which speaks
/// for its users; player ids arrive inside the messages.
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one gateway connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    tracing::info!("Gateway WebSocket connection established");

    // Spawn a task to send messages to the gateway
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the gateway
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(client_msg, &state_for_recv, &tx).await;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Gateway disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    tracing::info!("Gateway WebSocket connection closed");
}

/// Dispatch one gateway message into the same engine entry points the REST
/// routes use. Rejections go back as `Rejected`, never as a dropped
/// connection.
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
) {
    let reply = match msg {
        ClientMessage::StartGame { request } => match games::start_session(state, request) {
            Ok(update) => ServerMessage::SessionUpdate { update },
            Err(e) => ServerMessage::Rejected {
                session_id: None,
                reason: e.message,
            },
        },
        ClientMessage::Move {
            session_id,
            player_id,
            payload,
        } => match games::apply_move(state, session_id, player_id, payload).await {
            Ok(update) => ServerMessage::SessionUpdate { update },
            Err(e) => ServerMessage::Rejected {
                session_id: Some(session_id),
                reason: e.message,
            },
        },
        ClientMessage::GetSession { session_id } => {
            match games::session_snapshot(state, session_id) {
                Ok(update) => ServerMessage::SessionUpdate { update },
                Err(e) => ServerMessage::Rejected {
                    session_id: Some(session_id),
                    reason: e.message,
                },
            }
        }
    };

    let _ = tx.send(reply).await;
}
