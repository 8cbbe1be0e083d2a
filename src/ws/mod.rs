pub mod handlers;
mod impostor;
mod lobby;
mod secret_word;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt, Sink};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::{AppState, RoomEvent};
use crate::types::{PlayerId, RoomCode};

/// Who is on the other end of a socket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub player_id: Option<PlayerId>,
    pub room_code: Option<RoomCode>,
}

impl Session {
    pub fn enter(&mut self, room_code: RoomCode, player_id: PlayerId) {
        self.room_code = Some(room_code);
        self.player_id = Some(player_id);
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send; false when the socket is gone
async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            true
        }
    }
}

/// Room snapshot plus the personalised match view
async fn snapshot(state: &AppState, session: &Session) -> Vec<ServerMessage> {
    let Some(code) = session.room_code.as_deref() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    if let Some(room) = state.room_info(code).await {
        messages.push(ServerMessage::RoomUpdated { room });
    }
    if let Some(game) = state.game_view(code, session.player_id.as_deref()).await {
        messages.push(ServerMessage::GameUpdate { game });
    }
    messages
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::default();

    let welcome = ServerMessage::Welcome {
        protocol: PROTOCOL_VERSION.to_string(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if !send_json(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message");
        return;
    }

    // Events of the room this socket is in
    let mut room_rx: Option<broadcast::Receiver<RoomEvent>> = None;
    let mut subscribed_to: Option<RoomCode> = None;

    'conn: loop {
        tokio::select! {
            event = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    // Not in a room: wait forever
                    None => std::future::pending().await,
                }
            } => {
                let outgoing = match event {
                    Ok(RoomEvent::Message(msg)) => vec![msg],
                    Ok(RoomEvent::GameChanged) => {
                        let code = subscribed_to.as_deref().unwrap_or_default();
                        match state.game_view(code, session.player_id.as_deref()).await {
                            Some(game) => vec![ServerMessage::GameUpdate { game }],
                            None => Vec::new(),
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Room events lagged, resyncing");
                        snapshot(&state, &session).await
                    }
                    Err(RecvError::Closed) => {
                        room_rx = None;
                        subscribed_to = None;
                        Vec::new()
                    }
                };

                for msg in &outgoing {
                    if !send_json(&mut sender, msg).await {
                        break 'conn;
                    }
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text.as_str());

                        let response = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handlers::handle_message(client_msg, &mut session, &state).await
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse client message: {}", e);
                                Some(ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                })
                            }
                        };

                        if let Some(response) = response {
                            if !send_json(&mut sender, &response).await {
                                tracing::error!("Failed to send response");
                                break;
                            }
                        }

                        // Follow the session into its new room
                        if session.room_code != subscribed_to {
                            subscribed_to = session.room_code.clone();
                            room_rx = match subscribed_to.as_deref() {
                                Some(code) => state.subscribe(code).await,
                                None => None,
                            };
                            for msg in snapshot(&state, &session).await {
                                if !send_json(&mut sender, &msg).await {
                                    break 'conn;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if let (Some(code), Some(player_id)) = (session.room_code, session.player_id) {
        if let Err(e) = state.leave_room(&code, &player_id).await {
            tracing::debug!(room = %code, "Leave on disconnect failed: {}", e);
        }
    }
    tracing::info!("WebSocket connection closed");
}
