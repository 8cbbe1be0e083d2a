mod impostor;
mod room;
mod secret_word;

pub use room::generate_room_code;

use crate::config::ServerConfig;
use crate::error::{GameError, GameResult};
use crate::impostor::ImpostorMatch;
use crate::protocol::{GameKind, GameView, ImpostorView, RoomInfo, SecretWordView, ServerMessage};
use crate::roster::Roster;
use crate::secret_word::SecretWordMatch;
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Capacity of each room's event channel
const ROOM_CHANNEL_CAPACITY: usize = 64;

/// What a room's subscribers are told
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// Sent as-is to every connection in the room
    Message(ServerMessage),
    /// The match changed; each connection renders its own view
    GameChanged,
}

#[derive(Debug, Clone)]
pub enum RoomGame {
    Impostor(ImpostorMatch),
    SecretWord(SecretWordMatch),
}

impl RoomGame {
    pub fn kind(&self) -> GameKind {
        match self {
            RoomGame::Impostor(_) => GameKind::Impostor,
            RoomGame::SecretWord(_) => GameKind::SecretWord,
        }
    }
}

/// One online session: a lobby, its host and at most one running match
#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub players: Roster,
    pub game: Option<RoomGame>,
    pub rng: StdRng,
    pub created_at: DateTime<Utc>,
    events: broadcast::Sender<RoomEvent>,
}

impl Room {
    fn new(code: RoomCode, host_id: PlayerId, players: Roster, rng: StdRng) -> Self {
        let (events, _rx) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            code,
            host_id,
            players,
            game: None,
            rng,
            created_at: Utc::now(),
            events,
        }
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn require_host(&self, player_id: &str, action: &str) -> GameResult<()> {
        if !self.is_host(player_id) {
            return Err(GameError::NotHost(action.to_string()));
        }
        Ok(())
    }

    pub fn require_member(&self, player_id: &str) -> GameResult<()> {
        if !self.players.contains(player_id) {
            return Err(GameError::NotInRoom);
        }
        Ok(())
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            host_id: self.host_id.clone(),
            players: self.players.players().to_vec(),
            max_players: self.players.capacity(),
            max_impostors: crate::impostor::max_impostors(self.players.len()),
            game: self.game.as_ref().map(RoomGame::kind),
        }
    }

    /// Render the running match for one viewer
    pub fn game_view(&self, viewer: Option<&str>, now: DateTime<Utc>) -> Option<GameView> {
        let view = match self.game.as_ref()? {
            RoomGame::Impostor(game) => {
                GameView::Impostor(ImpostorView::for_player(game, viewer, now))
            }
            RoomGame::SecretWord(game) => {
                GameView::SecretWord(SecretWordView::for_player(game, viewer, now))
            }
        };
        Some(view)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Ignore send errors (no receivers connected is fine)
    pub fn notify(&self, event: RoomEvent) {
        let _ = self.events.send(event);
    }

    pub fn send(&self, msg: ServerMessage) {
        self.notify(RoomEvent::Message(msg));
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub rooms: Arc<RwLock<HashMap<RoomCode, Room>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Run `f` against a room under the write lock
    pub async fn with_room<T>(
        &self,
        code: &str,
        f: impl FnOnce(&mut Room) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        f(room)
    }

    pub async fn room_info(&self, code: &str) -> Option<RoomInfo> {
        let rooms = self.rooms.read().await;
        rooms.get(code).map(|r| r.info())
    }

    pub async fn subscribe(&self, code: &str) -> Option<broadcast::Receiver<RoomEvent>> {
        let rooms = self.rooms.read().await;
        rooms.get(code).map(Room::subscribe)
    }

    pub async fn game_view(&self, code: &str, viewer: Option<&str>) -> Option<GameView> {
        let rooms = self.rooms.read().await;
        rooms.get(code)?.game_view(viewer, Utc::now())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Apply expired deadlines in every room
    pub async fn tick_timers(&self, now: DateTime<Utc>) -> usize {
        let mut rooms = self.rooms.write().await;
        let mut changed = 0;

        for room in rooms.values_mut() {
            let Room { game, rng, .. } = &mut *room;
            let ticked = match game {
                Some(RoomGame::Impostor(game)) => game.tick(now),
                Some(RoomGame::SecretWord(game)) => game.tick(now, rng),
                None => false,
            };
            if ticked {
                tracing::debug!(room = %room.code, "Timer expired");
                room.notify(RoomEvent::GameChanged);
                changed += 1;
            }
        }
        changed
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impostor::VotingStyle;
    use chrono::TimeDelta;

    #[tokio::test]
    async fn test_missing_room() {
        let state = AppState::new();
        let result = state.with_room("NOPE1", |_| Ok(())).await;
        assert_eq!(result, Err(GameError::RoomNotFound("NOPE1".to_string())));
        assert!(state.room_info("NOPE1").await.is_none());
        assert!(state.subscribe("NOPE1").await.is_none());
    }

    #[tokio::test]
    async fn test_tick_expires_votes_and_notifies() {
        let state = AppState::new();
        let (code, host) = state.create_room("Host").await.unwrap();
        let bob = state.join_room(&code, "Bob").await.unwrap();
        let cara = state.join_room(&code, "Cara").await.unwrap();

        let config = ImpostorConfig {
            play_mode: PlayMode::SharedDevice,
            ..Default::default()
        };
        state.start_impostor(&code, &host.id, config).await.unwrap();
        state
            .impostor_next_phase(&code, &host.id, ImpostorPhase::Discussion)
            .await
            .unwrap();
        state
            .impostor_next_phase(&code, &host.id, ImpostorPhase::Voting)
            .await
            .unwrap();

        let mut rx = state.subscribe(&code).await.unwrap();
        let later = Utc::now() + TimeDelta::seconds(61);
        assert_eq!(state.tick_timers(later).await, 1);
        assert!(matches!(rx.recv().await, Ok(RoomEvent::GameChanged)));

        match state.game_view(&code, Some(&bob.id)).await {
            Some(GameView::Impostor(view)) => {
                let voting = view.voting.unwrap();
                assert_eq!(voting.style, VotingStyle::Sequential);
                assert_eq!(voting.pending.len(), 2);
                let pending = &voting.pending;
                assert!(pending.contains(&cara.id) || pending.contains(&bob.id));
            }
            other => panic!("unexpected view {:?}", other),
        }
    }
}
