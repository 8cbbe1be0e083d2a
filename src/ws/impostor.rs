//! Impostor message handlers

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;

use super::handlers::reply;

pub async fn handle_start(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    config: ImpostorConfig,
) -> Option<ServerMessage> {
    tracing::info!(room = %code, impostors = config.how_many_impostors, "Impostor start requested");
    reply(state.start_impostor(code, player_id, config).await)
}

pub async fn handle_next_phase(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    phase: ImpostorPhase,
) -> Option<ServerMessage> {
    tracing::info!(room = %code, phase = %phase, "Phase change requested");
    reply(state.impostor_next_phase(code, player_id, phase).await)
}

pub async fn handle_cast_vote(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    voted_id: Option<PlayerId>,
) -> Option<ServerMessage> {
    reply(state.cast_vote(code, player_id, voted_id).await)
}

pub async fn handle_manual_elimination(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    target: Option<PlayerId>,
) -> Option<ServerMessage> {
    tracing::info!(room = %code, target = ?target, "Manual elimination");
    reply(state.manual_elimination(code, player_id, target).await)
}
