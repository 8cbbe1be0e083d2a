//! Room membership handlers

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::RoomCode;
use std::sync::Arc;

use super::Session;

/// Leave whatever room the session is in before entering another
async fn leave_current(state: &Arc<AppState>, session: &mut Session) {
    if let (Some(code), Some(player_id)) = (session.room_code.take(), session.player_id.take()) {
        if let Err(e) = state.leave_room(&code, &player_id).await {
            tracing::debug!(room = %code, "Leave on switch failed: {}", e);
        }
    }
}

pub async fn handle_create_room(
    state: &Arc<AppState>,
    session: &mut Session,
    name: String,
) -> Option<ServerMessage> {
    leave_current(state, session).await;

    match state.create_room(&name).await {
        Ok((room_code, host)) => {
            session.enter(room_code.clone(), host.id.clone());
            Some(ServerMessage::Joined {
                room_code,
                player_id: host.id,
            })
        }
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_join_room(
    state: &Arc<AppState>,
    session: &mut Session,
    room_code: RoomCode,
    name: String,
) -> Option<ServerMessage> {
    let room_code = room_code.trim().to_uppercase();
    if session.room_code.as_deref() == Some(room_code.as_str()) {
        if let Some(player_id) = session.player_id.clone() {
            return Some(ServerMessage::Joined {
                room_code,
                player_id,
            });
        }
    }
    // A bad code or name must not cost the player their current room
    if let Err(e) = state.check_join(&room_code, &name).await {
        tracing::warn!(room = %room_code, code = e.code(), "Join rejected: {}", e);
        return Some(e.into());
    }
    leave_current(state, session).await;

    match state.join_room(&room_code, &name).await {
        Ok(player) => {
            session.enter(room_code.clone(), player.id.clone());
            Some(ServerMessage::Joined {
                room_code,
                player_id: player.id,
            })
        }
        Err(e) => {
            tracing::warn!(room = %room_code, code = e.code(), "Join rejected: {}", e);
            Some(e.into())
        }
    }
}

pub async fn handle_leave_room(
    state: &Arc<AppState>,
    session: &mut Session,
) -> Option<ServerMessage> {
    leave_current(state, session).await;
    None
}
