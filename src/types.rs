use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type RoomCode = String;
pub type TeamId = String;

/// A lobby player, shared by both games
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Running total across finished matches
    pub score: f64,
    /// Total as of the start of the current round, used for ranking
    pub global_score: f64,
    pub emoji: String,
    pub color: String,
}

// ========== Impostor ==========

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ImpostorPhase {
    Reveal,
    Discussion,
    Voting,
    Elimination,
    Result,
}

impl std::fmt::Display for ImpostorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImpostorPhase::Reveal => "reveal",
            ImpostorPhase::Discussion => "discussion",
            ImpostorPhase::Voting => "voting",
            ImpostorPhase::Elimination => "elimination",
            ImpostorPhase::Result => "result",
        };
        f.write_str(name)
    }
}

/// How a match is played: passing one device around, or each player on their own
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    SharedDevice,
    #[default]
    Online,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpostorConfig {
    pub how_many_impostors: usize,
    #[serde(default)]
    pub selected_categories: Vec<String>,
    /// Split the crew in two groups holding similar words
    #[serde(default)]
    pub two_words_mode: bool,
    #[serde(default)]
    pub impostor_has_hint: bool,
    /// Announce a random player who opens the discussion
    #[serde(default = "default_true")]
    pub who_starts: bool,
    #[serde(default = "default_true")]
    pub impostor_can_start: bool,
    #[serde(default)]
    pub play_mode: PlayMode,
}

fn default_true() -> bool {
    true
}

impl Default for ImpostorConfig {
    fn default() -> Self {
        Self {
            how_many_impostors: 1,
            selected_categories: Vec::new(),
            two_words_mode: false,
            impostor_has_hint: false,
            who_starts: true,
            impostor_can_start: true,
            play_mode: PlayMode::Online,
        }
    }
}

/// A player as seen by one impostor round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpostorPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub is_impostor: bool,
    pub is_alive: bool,
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Who this player voted for in the current voting round (`None` = abstained or not yet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<PlayerId>,
}

impl ImpostorPlayer {
    pub fn id(&self) -> &PlayerId {
        &self.player.id
    }
}

// ========== Secret Word ==========

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SecretWordMode {
    Blitz,
    Duel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SecretWordPhase {
    TeamReveal,
    Action,
    Result,
}

impl std::fmt::Display for SecretWordPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SecretWordPhase::TeamReveal => "team-reveal",
            SecretWordPhase::Action => "action",
            SecretWordPhase::Result => "result",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretWordConfig {
    pub mode: SecretWordMode,
    pub team_count: usize,
    /// Seconds per blitz turn or per duel answer
    pub round_seconds: u32,
    /// Words per duel match (blitz plays one turn per team)
    #[serde(default = "default_match_limit")]
    pub match_limit: u32,
    #[serde(default)]
    pub selected_categories: Vec<String>,
}

fn default_match_limit() -> u32 {
    5
}

impl SecretWordConfig {
    pub fn blitz(team_count: usize) -> Self {
        Self {
            mode: SecretWordMode::Blitz,
            team_count,
            round_seconds: 60,
            match_limit: 1,
            selected_categories: Vec::new(),
        }
    }

    pub fn duel(team_count: usize) -> Self {
        Self {
            mode: SecretWordMode::Duel,
            team_count,
            round_seconds: 15,
            match_limit: default_match_limit(),
            selected_categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretTeam {
    pub id: TeamId,
    pub name: String,
    pub player_ids: Vec<PlayerId>,
    pub score: u32,
    pub round_score: u32,
    pub color: String,
    /// Member giving the clues
    pub operator_id: Option<PlayerId>,
    pub words_guessed: Vec<String>,
}
