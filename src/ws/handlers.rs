//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Room membership is checked here, then dispatched to the lobby and game
//! handler modules. Host checks live with the room state.

use crate::error::{GameError, GameResult};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{impostor, lobby, secret_word, Session};

/// Macro to resolve the caller's room and return early when they have none
macro_rules! in_room {
    ($session:expr) => {
        match ($session.room_code.clone(), $session.player_id.clone()) {
            (Some(code), Some(player_id)) => (code, player_id),
            _ => return Some(GameError::NotInRoom.into()),
        }
    };
}

/// Turn a state result into the optional direct reply
pub(super) fn reply(result: GameResult<()>) -> Option<ServerMessage> {
    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(code = e.code(), "Rejected: {}", e);
            Some(e.into())
        }
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    session: &mut Session,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Lobby messages
        ClientMessage::CreateRoom { name } => lobby::handle_create_room(state, session, name).await,

        ClientMessage::JoinRoom { room_code, name } => {
            lobby::handle_join_room(state, session, room_code, name).await
        }

        ClientMessage::LeaveRoom => {
            in_room!(session);
            lobby::handle_leave_room(state, session).await
        }

        ClientMessage::ReturnToLobby => {
            let (code, player_id) = in_room!(session);
            reply(state.return_to_lobby(&code, &player_id).await)
        }

        // Impostor
        ClientMessage::StartGame { config } => {
            let (code, player_id) = in_room!(session);
            impostor::handle_start(state, &code, &player_id, config).await
        }

        ClientMessage::NextPhase { phase } => {
            let (code, player_id) = in_room!(session);
            impostor::handle_next_phase(state, &code, &player_id, phase).await
        }

        ClientMessage::ToggleReady => {
            let (code, player_id) = in_room!(session);
            reply(state.toggle_ready(&code, &player_id).await)
        }

        ClientMessage::CastVote { voted_id } => {
            let (code, player_id) = in_room!(session);
            impostor::handle_cast_vote(state, &code, &player_id, voted_id).await
        }

        ClientMessage::ConfirmElimination => {
            let (code, player_id) = in_room!(session);
            reply(state.confirm_elimination(&code, &player_id).await)
        }

        ClientMessage::ManualElimination { player_id: target } => {
            let (code, player_id) = in_room!(session);
            impostor::handle_manual_elimination(state, &code, &player_id, target).await
        }

        ClientMessage::RerollGame => {
            let (code, player_id) = in_room!(session);
            reply(state.reroll_impostor(&code, &player_id).await)
        }

        // Secret Word
        ClientMessage::StartSecretWord { config, assignment } => {
            let (code, player_id) = in_room!(session);
            secret_word::handle_start(state, &code, &player_id, config, assignment).await
        }

        ClientMessage::SecretWord { action } => {
            let (code, player_id) = in_room!(session);
            secret_word::handle_action(state, &code, &player_id, action).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImpostorPhase;

    #[tokio::test]
    async fn test_requires_room() {
        let state = Arc::new(AppState::new());
        let mut session = Session::default();

        let result = handle_message(ClientMessage::ToggleReady, &mut session, &state).await;
        match result {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_IN_ROOM"),
            other => panic!("Expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_host_command() {
        let state = Arc::new(AppState::new());
        let mut host = Session::default();
        let mut guest = Session::default();

        handle_message(
            ClientMessage::CreateRoom { name: "Ana".into() },
            &mut host,
            &state,
        )
        .await;
        let code = host.room_code.clone().unwrap();
        handle_message(
            ClientMessage::JoinRoom {
                room_code: code,
                name: "Bob".into(),
            },
            &mut guest,
            &state,
        )
        .await;

        let result = handle_message(
            ClientMessage::NextPhase {
                phase: ImpostorPhase::Discussion,
            },
            &mut guest,
            &state,
        )
        .await;
        match result {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "UNAUTHORIZED"),
            other => panic!("Expected UNAUTHORIZED, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_join_keeps_current_room() {
        let state = Arc::new(AppState::new());
        let mut sessions = vec![Session::default(), Session::default(), Session::default()];

        handle_message(
            ClientMessage::CreateRoom { name: "Ana".into() },
            &mut sessions[0],
            &state,
        )
        .await;
        let code = sessions[0].room_code.clone().unwrap();
        for (session, name) in sessions[1..].iter_mut().zip(["Bob", "Cara"]) {
            handle_message(
                ClientMessage::JoinRoom {
                    room_code: code.clone(),
                    name: name.into(),
                },
                session,
                &state,
            )
            .await;
        }
        handle_message(
            ClientMessage::StartGame {
                config: Default::default(),
            },
            &mut sessions[0],
            &state,
        )
        .await;

        let result = handle_message(
            ClientMessage::JoinRoom {
                room_code: "ZZZZZ".into(),
                name: "Bob".into(),
            },
            &mut sessions[1],
            &state,
        )
        .await;
        match result {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "ROOM_NOT_FOUND"),
            other => panic!("Expected ROOM_NOT_FOUND, got {:?}", other),
        }
        assert_eq!(sessions[1].room_code.as_deref(), Some(code.as_str()));
        let room = state.room_info(&code).await.unwrap();
        assert_eq!(room.players.len(), 3);
        assert!(room.game.is_some());
    }
}
