use super::{AppState, Room, RoomEvent, RoomGame};
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::rng::room_rng;
use crate::roster::Roster;
use crate::types::*;
use rand::Rng;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random room code (5 characters)
pub fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Normalise what a user typed as a room code
fn clean_code(code: &str) -> RoomCode {
    code.trim().to_uppercase()
}

/// What happened when a player left
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub room_closed: bool,
    pub new_host: Option<PlayerId>,
    pub game_aborted: bool,
}

impl AppState {
    /// Open a room with `name` as its host
    pub async fn create_room(&self, name: &str) -> GameResult<(RoomCode, Player)> {
        let mut rooms = self.rooms.write().await;

        // Collision - try again (rare with 28M combinations)
        let code = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let mut rng = room_rng(self.config.rng_seed);
        let mut players = Roster::with_capacity(self.config.max_room_players);
        let host = players.add_player(name, &mut rng)?;

        tracing::info!(room = %code, host = %host.name, "Room created");
        rooms.insert(
            code.clone(),
            Room::new(code.clone(), host.id.clone(), players, rng),
        );
        Ok((code, host))
    }

    /// Would `join_room` accept `name` right now
    pub async fn check_join(&self, code: &str, name: &str) -> GameResult<()> {
        let code = clean_code(code);
        let rooms = self.rooms.read().await;
        let room = rooms
            .get(&code)
            .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;
        room.require_lobby()?;
        room.players.admit(name).map(|_| ())
    }

    /// Add a player to a room that is still in its lobby
    pub async fn join_room(&self, code: &str, name: &str) -> GameResult<Player> {
        let code = clean_code(code);
        self.with_room(&code, |room| {
            room.require_lobby()?;
            let Room { players, rng, .. } = &mut *room;
            let player = players.add_player(name, rng)?;

            tracing::info!(room = %room.code, player = %player.name, "Player joined");
            room.send(ServerMessage::RoomUpdated { room: room.info() });
            Ok(player)
        })
        .await
    }

    /// Remove a player; hands over the host role, aborts a running match and
    /// closes the room once it is empty
    pub async fn leave_room(&self, code: &str, player_id: &str) -> GameResult<Departure> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;

        let player = room.players.remove(player_id).ok_or(GameError::NotInRoom)?;
        tracing::info!(room = %code, player = %player.name, "Player left");

        if room.players.is_empty() {
            rooms.remove(code);
            tracing::info!(room = %code, "Room closed");
            return Ok(Departure {
                room_closed: true,
                new_host: None,
                game_aborted: false,
            });
        }

        let mut departure = Departure {
            room_closed: false,
            new_host: None,
            game_aborted: false,
        };

        if let Some(game) = room.game.take() {
            sync_scores(&mut room.players, &game);
            departure.game_aborted = true;
            room.send(ServerMessage::ForceLobby {
                reason: format!("{} left the game", player.name),
            });
        }

        if room.host_id == player_id {
            if let Some(next) = room.players.players().first() {
                room.host_id = next.id.clone();
                departure.new_host = Some(next.id.clone());
                tracing::info!(room = %code, host = %next.name, "Host changed");
                room.send(ServerMessage::HostChanged {
                    host_id: next.id.clone(),
                });
            }
        }

        room.send(ServerMessage::PlayerLeft {
            player_id: player_id.to_string(),
        });
        room.send(ServerMessage::RoomUpdated {
            room: room.info(),
        });
        Ok(departure)
    }

    /// Host ends the match and everyone goes back to the lobby
    pub async fn return_to_lobby(&self, code: &str, player_id: &str) -> GameResult<()> {
        self.with_room(code, |room| {
            room.require_host(player_id, "return to the lobby")?;
            let game = room.game.take().ok_or(GameError::NoActiveGame)?;
            sync_scores(&mut room.players, &game);

            room.send(ServerMessage::ForceLobby {
                reason: "The host returned to the lobby".to_string(),
            });
            room.send(ServerMessage::RoomUpdated { room: room.info() });
            Ok(())
        })
        .await
    }
}

/// Copy match scores back onto the lobby players
fn sync_scores(players: &mut Roster, game: &RoomGame) {
    if let RoomGame::Impostor(game) = game {
        players.sync_scores(game.players.iter().map(|p| &p.player));
    }
}

impl Room {
    /// Announce a match change to every connection
    pub fn game_changed(&self) {
        self.notify(RoomEvent::GameChanged);
    }

    fn require_lobby(&self) -> GameResult<()> {
        if self.game.is_some() {
            return Err(GameError::WrongPhase("a running game".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_charset() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_CHARS.contains(&b)));
        }
    }

    #[tokio::test]
    async fn test_create_and_join() {
        let state = AppState::new();
        let (code, host) = state.create_room("Ana").await.unwrap();
        let mut rx = state.subscribe(&code).await.unwrap();

        let bob = state.join_room(&code.to_lowercase(), "Bob").await.unwrap();
        match rx.recv().await.unwrap() {
            RoomEvent::Message(ServerMessage::RoomUpdated { room }) => {
                assert_eq!(room.host_id, host.id);
                assert_eq!(room.players.len(), 2);
                assert_eq!(room.players[1].id, bob.id);
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert!(matches!(
            state.join_room(&code, "bob").await,
            Err(GameError::DuplicateName(_))
        ));
        assert!(matches!(
            state.join_room("ZZZZZ", "Cara").await,
            Err(GameError::RoomNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_room_capacity_from_config() {
        let state = AppState::with_config(crate::config::ServerConfig {
            max_room_players: 2,
            ..Default::default()
        });
        let (code, _) = state.create_room("Ana").await.unwrap();
        state.join_room(&code, "Bob").await.unwrap();
        assert_eq!(
            state.join_room(&code, "Cara").await,
            Err(GameError::RoomFull(2))
        );
    }

    #[tokio::test]
    async fn test_host_leaves() {
        let state = AppState::new();
        let (code, host) = state.create_room("Ana").await.unwrap();
        let bob = state.join_room(&code, "Bob").await.unwrap();
        let mut rx = state.subscribe(&code).await.unwrap();

        let departure = state.leave_room(&code, &host.id).await.unwrap();
        assert_eq!(departure.new_host, Some(bob.id.clone()));
        assert!(!departure.room_closed);

        assert!(matches!(
            rx.recv().await.unwrap(),
            RoomEvent::Message(ServerMessage::HostChanged { ref host_id }) if *host_id == bob.id
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            RoomEvent::Message(ServerMessage::PlayerLeft { .. })
        ));

        let departure = state.leave_room(&code, &bob.id).await.unwrap();
        assert!(departure.room_closed);
        assert_eq!(state.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_leaving_aborts_match() {
        let state = AppState::new();
        let (code, host) = state.create_room("Ana").await.unwrap();
        let bob = state.join_room(&code, "Bob").await.unwrap();
        state.join_room(&code, "Cara").await.unwrap();
        state
            .start_impostor(&code, &host.id, ImpostorConfig::default())
            .await
            .unwrap();

        assert!(matches!(
            state.join_room(&code, "Dan").await,
            Err(GameError::WrongPhase(_))
        ));

        let mut rx = state.subscribe(&code).await.unwrap();
        let departure = state.leave_room(&code, &bob.id).await.unwrap();
        assert!(departure.game_aborted);
        assert!(matches!(
            rx.recv().await.unwrap(),
            RoomEvent::Message(ServerMessage::ForceLobby { .. })
        ));
        assert_eq!(state.room_info(&code).await.unwrap().game, None);
    }

    #[tokio::test]
    async fn test_check_join_leaves_room_untouched() {
        let state = AppState::new();
        let (code, _) = state.create_room("Ana").await.unwrap();

        assert_eq!(state.check_join(&code.to_lowercase(), "Bob").await, Ok(()));
        assert!(matches!(
            state.check_join(&code, " ana ").await,
            Err(GameError::DuplicateName(_))
        ));
        assert!(matches!(
            state.check_join("ZZZZZ", "Bob").await,
            Err(GameError::RoomNotFound(_))
        ));
        assert_eq!(state.room_info(&code).await.unwrap().players.len(), 1);
    }
}
