use crate::error::GameError;
use crate::impostor::{ImpostorMatch, Outcome, ScoreLine, VoteTally, VotingStyle};
use crate::secret_word::{SecretWordAction, SecretWordMatch, TeamAssignment};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        room_code: RoomCode,
        name: String,
    },
    LeaveRoom,
    /// Host starts an Impostor match
    StartGame {
        config: ImpostorConfig,
    },
    NextPhase {
        phase: ImpostorPhase,
    },
    ToggleReady,
    CastVote {
        voted_id: Option<PlayerId>,
    },
    ConfirmElimination,
    ManualElimination {
        player_id: Option<PlayerId>,
    },
    /// New word and impostors during reveal, next round once the match is decided
    RerollGame,
    ReturnToLobby,
    StartSecretWord {
        config: SecretWordConfig,
        #[serde(default)]
        assignment: TeamAssignment,
    },
    SecretWord {
        action: SecretWordAction,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    Impostor,
    SecretWord,
}

/// Lobby snapshot sent on every membership change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    pub max_players: usize,
    /// Largest impostor count the current lobby allows
    pub max_impostors: usize,
    pub game: Option<GameKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpostorPlayerView {
    #[serde(flatten)]
    pub player: Player,
    pub is_alive: bool,
    /// `None` when hidden from the viewer
    pub is_impostor: Option<bool>,
    pub word: Option<String>,
    pub hint: Option<String>,
    pub ready: bool,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VotingView {
    pub style: VotingStyle,
    pub current_voter: Option<PlayerId>,
    pub pending: Vec<PlayerId>,
    pub seconds_left: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpostorView {
    pub config: ImpostorConfig,
    pub phase: ImpostorPhase,
    pub round_no: u32,
    pub players: Vec<ImpostorPlayerView>,
    pub who_starts: Option<PlayerId>,
    pub voting: Option<VotingView>,
    pub tally: Option<VoteTally>,
    pub pending_elimination: Option<PlayerId>,
    pub last_eliminated: Option<PlayerId>,
    pub outcome: Outcome,
    pub round_scores: Vec<ScoreLine>,
    /// Player ids by ranking total, best first
    pub standings: Vec<PlayerId>,
    /// The secret word, only once roles are public
    pub word: Option<String>,
}

impl ImpostorView {
    /// What `viewer` may see of the match.
    ///
    /// On a shared device and after the match is decided everything is public;
    /// otherwise a player sees their own card plus the roles of eliminated players.
    pub fn for_player(game: &ImpostorMatch, viewer: Option<&str>, now: DateTime<Utc>) -> Self {
        let public = game.config.play_mode == PlayMode::SharedDevice || game.is_over();

        let players = game
            .players
            .iter()
            .map(|p| {
                let own = viewer == Some(p.id().as_str());
                let visible = public || own;
                ImpostorPlayerView {
                    player: p.player.clone(),
                    is_alive: p.is_alive,
                    is_impostor: (visible || !p.is_alive).then_some(p.is_impostor),
                    word: if visible { p.word.clone() } else { None },
                    hint: if visible { p.hint.clone() } else { None },
                    ready: game.ready.contains(p.id()),
                    has_voted: game.voting.as_ref().is_some_and(|v| v.has_voted(p.id())),
                }
            })
            .collect();

        let voting = game.voting.as_ref().map(|v| VotingView {
            style: v.style,
            current_voter: v.current_voter().cloned(),
            pending: v.pending_voters(),
            seconds_left: v.seconds_left(now),
        });

        Self {
            config: game.config.clone(),
            phase: game.phase,
            round_no: game.round_no,
            players,
            who_starts: game.who_starts.clone(),
            voting,
            tally: game.last_tally.clone(),
            pending_elimination: game.pending_elimination.clone(),
            last_eliminated: game.last_eliminated.clone(),
            outcome: game.outcome_if_decided(),
            round_scores: game.round_scores.clone(),
            standings: game.standings().into_iter().map(|p| p.id).collect(),
            word: game.is_over().then(|| game.word.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretWordView {
    pub config: SecretWordConfig,
    pub phase: SecretWordPhase,
    pub round_no: u32,
    pub teams: Vec<SecretTeam>,
    pub current_team_id: Option<TeamId>,
    pub operator_id: Option<PlayerId>,
    /// Only the active operator sees the word
    pub word: Option<String>,
    pub revealed: bool,
    pub timer_running: bool,
    pub seconds_left: u32,
    pub skips_left: Option<u32>,
    pub turn_score: Option<u32>,
    pub match_idx: u32,
    /// Team ids by total score, best first
    pub standings: Vec<TeamId>,
}

impl SecretWordView {
    pub fn for_player(game: &SecretWordMatch, viewer: Option<&str>, now: DateTime<Utc>) -> Self {
        let operator_id = game.current_operator().cloned();
        let is_operator = viewer.is_some() && operator_id.as_deref() == viewer;

        let (revealed, timer_running, seconds_left) = match (&game.blitz, &game.duel) {
            (Some(turn), _) => (turn.revealed, turn.started(), turn.seconds_left(now)),
            (_, Some(round)) => (
                round.revealed,
                round.timer_running(),
                round.seconds_left(now),
            ),
            _ => (false, false, game.config.round_seconds),
        };

        Self {
            config: game.config.clone(),
            phase: game.phase,
            round_no: game.round_no,
            teams: game.teams.clone(),
            current_team_id: game.current_team().map(|t| t.id.clone()),
            operator_id,
            word: if is_operator {
                game.current_word().map(str::to_string)
            } else {
                None
            },
            revealed,
            timer_running,
            seconds_left,
            skips_left: game.blitz.as_ref().map(|t| t.skips_left),
            turn_score: game.blitz.as_ref().map(|t| t.score),
            match_idx: game.match_idx,
            standings: game
                .standings()
                .into_iter()
                .map(|t| t.id.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GameView {
    Impostor(ImpostorView),
    SecretWord(SecretWordView),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        server_now: String,
    },
    Joined {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    RoomUpdated {
        room: RoomInfo,
    },
    /// Personalised per recipient
    GameUpdate {
        game: GameView,
    },
    HostChanged {
        host_id: PlayerId,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    ForceLobby {
        reason: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
