use super::{AppState, Room, RoomGame};
use crate::error::{GameError, GameResult};
use crate::impostor::ImpostorMatch;
use crate::types::*;
use chrono::Utc;

impl Room {
    fn impostor_mut(&mut self) -> GameResult<&mut ImpostorMatch> {
        match self.game.as_mut() {
            Some(RoomGame::Impostor(game)) => Ok(game),
            _ => Err(GameError::NoActiveGame),
        }
    }
}

impl AppState {
    /// Host deals a new Impostor match with everyone in the lobby
    pub async fn start_impostor(
        &self,
        code: &str,
        player_id: &str,
        config: ImpostorConfig,
    ) -> GameResult<()> {
        let vote_seconds = self.config.vote_seconds;
        self.with_room(code, |room| {
            room.require_host(player_id, "start the game")?;
            if room.game.is_some() {
                return Err(GameError::WrongPhase("a running game".to_string()));
            }

            let game =
                ImpostorMatch::new(room.players.players(), config, vote_seconds, &mut room.rng)?;
            tracing::info!(
                room = %room.code,
                players = game.players.len(),
                impostors = game.config.how_many_impostors,
                mode = ?game.config.play_mode,
                "Impostor match started"
            );
            room.game = Some(RoomGame::Impostor(game));
            room.game_changed();
            Ok(())
        })
        .await
    }

    pub async fn impostor_next_phase(
        &self,
        code: &str,
        player_id: &str,
        phase: ImpostorPhase,
    ) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "change the phase")?;
            room.impostor_mut()?.advance(phase, Utc::now())?;
            room.game_changed();
            Ok(())
        })
        .await
    }

    /// Player confirms they have seen their card
    pub async fn toggle_ready(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_member(player_id)?;
            room.impostor_mut()?.toggle_ready(player_id)?;
            room.game_changed();
            Ok(())
        })
        .await
    }

    /// Online every player votes for themselves; on a shared device the host
    /// enters the vote of whoever's turn it is
    pub async fn cast_vote(
        &self,
        code: &str,
        player_id: &str,
        target: Option<PlayerId>,
    ) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_member(player_id)?;
            let is_host = room.is_host(player_id);
            let game = room.impostor_mut()?;

            let voter = match game.config.play_mode {
                PlayMode::Online => player_id.to_string(),
                PlayMode::SharedDevice => {
                    if !is_host {
                        return Err(GameError::NotHost("enter votes".to_string()));
                    }
                    game.current_voter()
                        .cloned()
                        .ok_or_else(|| GameError::WrongPhase(game.phase.to_string()))?
                }
            };

            game.cast_vote(&voter, target, Utc::now())?;
            tracing::debug!(room = %room.code, voter = %voter, "Vote cast");
            room.game_changed();
            Ok(())
        })
        .await
    }

    pub async fn confirm_elimination(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "confirm the elimination")?;
            room.impostor_mut()?.confirm_elimination()?;
            room.game_changed();
            Ok(())
        })
        .await
    }

    pub async fn manual_elimination(
        &self,
        code: &str,
        player_id: &str,
        target: Option<PlayerId>,
    ) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "eliminate players")?;
            room.impostor_mut()?.manual_elimination(target)?;
            room.game_changed();
            Ok(())
        })
        .await
    }

    /// Redeal during the reveal, or start the next round once the match is decided
    pub async fn reroll_impostor(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "reroll the game")?;
            let Room {
                game,
                rng,
                players,
                ..
            } = &mut *room;
            let game = match game.as_mut() {
                Some(RoomGame::Impostor(game)) => game,
                _ => return Err(GameError::NoActiveGame),
            };

            if game.is_over() {
                players.sync_scores(game.players.iter().map(|p| &p.player));
                game.next_round(rng)?;
            } else {
                game.reroll(rng)?;
            }
            room.game_changed();
            Ok(())
        })
        .await
    }
}
