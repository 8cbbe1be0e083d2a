use crate::types::PlayerId;

pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced to players as `error` messages
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("The name \"{0}\" is already taken, please choose another one")]
    DuplicateName(String),

    #[error("Room is full ({0} players max)")]
    RoomFull(usize),

    #[error("Need at least {required} players, have {actual}")]
    NotEnoughPlayers { required: usize, actual: usize },

    #[error("Invalid impostor count {requested} for {players} players (max {max})")]
    InvalidImpostorCount {
        requested: usize,
        players: usize,
        max: usize,
    },

    #[error("Team count must be between 2 and 10, got {0}")]
    InvalidTeamCount(usize),

    #[error("Every team needs at least one player")]
    EmptyTeam,

    #[error("With 4 or more players every team needs at least 2 members")]
    SoloTeam,

    #[error("Invalid time limit {0}s")]
    InvalidTimeLimit(u32),

    #[error("Action not allowed during {0}")]
    WrongPhase(String),

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} cannot vote right now")]
    NotYourTurn(PlayerId),

    #[error("Player {0} has already voted")]
    AlreadyVoted(PlayerId),

    #[error("Invalid vote target: {0}")]
    InvalidVoteTarget(PlayerId),

    #[error("Not everyone has seen their word yet")]
    PlayersNotReady,

    #[error("No skips left")]
    NoSkipsLeft,

    #[error("The word must be revealed first")]
    WordNotRevealed,

    #[error("The timer has not started")]
    TimerNotStarted,

    #[error("Not allowed while the timer is running")]
    TimerRunning,

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("You are not in a room")]
    NotInRoom,

    #[error("Only the host can {0}")]
    NotHost(String),

    #[error("No game in progress")]
    NoActiveGame,
}

impl GameError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::EmptyName => "EMPTY_NAME",
            GameError::DuplicateName(_) => "DUPLICATE_NAME",
            GameError::RoomFull(_) => "ROOM_FULL",
            GameError::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            GameError::InvalidImpostorCount { .. } => "INVALID_IMPOSTOR_COUNT",
            GameError::InvalidTeamCount(_) => "INVALID_TEAM_COUNT",
            GameError::EmptyTeam => "EMPTY_TEAM",
            GameError::SoloTeam => "SOLO_TEAM",
            GameError::InvalidTimeLimit(_) => "INVALID_TIME_LIMIT",
            GameError::WrongPhase(_) => "WRONG_PHASE",
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            GameError::NotYourTurn(_) => "NOT_YOUR_TURN",
            GameError::AlreadyVoted(_) => "ALREADY_VOTED",
            GameError::InvalidVoteTarget(_) => "INVALID_VOTE_TARGET",
            GameError::PlayersNotReady => "PLAYERS_NOT_READY",
            GameError::NoSkipsLeft => "NO_SKIPS_LEFT",
            GameError::WordNotRevealed => "WORD_NOT_REVEALED",
            GameError::TimerNotStarted => "TIMER_NOT_STARTED",
            GameError::TimerRunning => "TIMER_RUNNING",
            GameError::TeamNotFound(_) => "TEAM_NOT_FOUND",
            GameError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            GameError::NotInRoom => "NOT_IN_ROOM",
            GameError::NotHost(_) => "UNAUTHORIZED",
            GameError::NoActiveGame => "NO_ACTIVE_GAME",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(GameError::EmptyName.code(), "EMPTY_NAME");
        assert_eq!(GameError::NotHost("start".into()).code(), "UNAUTHORIZED");
        assert_eq!(
            GameError::NotEnoughPlayers {
                required: 3,
                actual: 2
            }
            .to_string(),
            "Need at least 3 players, have 2"
        );
    }
}
