//! Secret Word message handlers

use crate::protocol::ServerMessage;
use crate::secret_word::{SecretWordAction, TeamAssignment};
use crate::state::AppState;
use crate::types::SecretWordConfig;
use std::sync::Arc;

use super::handlers::reply;

pub async fn handle_start(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    config: SecretWordConfig,
    assignment: TeamAssignment,
) -> Option<ServerMessage> {
    tracing::info!(
        room = %code,
        mode = ?config.mode,
        teams = config.team_count,
        "Secret Word start requested"
    );
    reply(
        state
            .start_secret_word(code, player_id, config, assignment)
            .await,
    )
}

pub async fn handle_action(
    state: &Arc<AppState>,
    code: &str,
    player_id: &str,
    action: SecretWordAction,
) -> Option<ServerMessage> {
    reply(state.secret_word_action(code, player_id, action).await)
}
