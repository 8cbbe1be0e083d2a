use super::{AppState, Room, RoomGame};
use crate::error::{GameError, GameResult};
use crate::secret_word::{SecretWordAction, SecretWordMatch, TeamAssignment};
use crate::types::*;
use chrono::Utc;

impl AppState {
    /// Host splits the lobby into teams and opens the team reveal
    pub async fn start_secret_word(
        &self,
        code: &str,
        player_id: &str,
        config: SecretWordConfig,
        assignment: TeamAssignment,
    ) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "start the game")?;
            if room.game.is_some() {
                return Err(GameError::WrongPhase("a running game".to_string()));
            }

            let ids = room.players.ids();
            let game = SecretWordMatch::new(&ids, config, &assignment, &mut room.rng)?;
            tracing::info!(room = %room.code, teams = game.teams.len(), "Secret Word started");
            room.game = Some(RoomGame::SecretWord(game));
            room.game_changed();
            Ok(())
        })
        .await
    }

    /// Team setup and round control belong to the host; play actions are open
    /// to the host and the operator of the active team
    pub async fn secret_word_action(
        &self,
        code: &str,
        player_id: &str,
        action: SecretWordAction,
    ) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_member(player_id)?;
            let is_host = room.is_host(player_id);
            let Room { game, rng, .. } = &mut *room;
            let game = match game.as_mut() {
                Some(RoomGame::SecretWord(game)) => game,
                _ => return Err(GameError::NoActiveGame),
            };

            if action.host_only() {
                if !is_host {
                    return Err(GameError::NotHost("set up teams".to_string()));
                }
            } else if !is_host && game.current_operator().map(String::as_str) != Some(player_id) {
                return Err(GameError::NotYourTurn(player_id.to_string()));
            }

            tracing::debug!(action = ?action, "Secret Word action");
            game.apply(action, Utc::now(), rng)?;
            room.game_changed();
            Ok(())
        })
        .await
    }
}
