use crate::error::{GameError, GameResult};
use crate::rng::RandomSource;
use crate::types::*;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_TEAMS: usize = 2;
pub const MAX_TEAMS: usize = 10;

pub const TEAM_NAMES: [&str; MAX_TEAMS] = [
    "Squad Alpha",
    "Squad Bravo",
    "Squad Charlie",
    "Squad Delta",
    "Squad Echo",
    "Squad Foxtrot",
    "Squad Golf",
    "Squad Hotel",
    "Squad India",
    "Squad Juliet",
];

pub const TEAM_COLORS: [&str; MAX_TEAMS] = [
    "#3b82f6", "#ff003c", "#10b981", "#facc15", "#a855f7", "#ec4899", "#06b6d4", "#f97316",
    "#84cc16", "#64748b",
];

/// How players end up in teams
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TeamAssignment {
    #[default]
    Random,
    /// Team index per player; unknown or out-of-range entries land in team 0
    Manual { teams: HashMap<PlayerId, usize> },
}

fn check_team_count(team_count: usize) -> GameResult<()> {
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
        return Err(GameError::InvalidTeamCount(team_count));
    }
    Ok(())
}

fn empty_teams(team_count: usize) -> Vec<SecretTeam> {
    (0..team_count)
        .map(|i| SecretTeam {
            id: format!("team-{}", i),
            name: TEAM_NAMES[i].to_string(),
            player_ids: Vec::new(),
            score: 0,
            round_score: 0,
            color: TEAM_COLORS[i].to_string(),
            operator_id: None,
            words_guessed: Vec::new(),
        })
        .collect()
}

/// Shuffle players and deal them round-robin into `team_count` teams
pub fn create_teams<R: RandomSource + ?Sized>(
    player_ids: &[PlayerId],
    team_count: usize,
    rng: &mut R,
) -> GameResult<Vec<SecretTeam>> {
    check_team_count(team_count)?;

    let mut shuffled = player_ids.to_vec();
    shuffled.shuffle(rng);

    let mut teams = empty_teams(team_count);
    for (idx, id) in shuffled.into_iter().enumerate() {
        teams[idx % team_count].player_ids.push(id);
    }

    validate_teams(&teams, player_ids.len())?;
    Ok(teams)
}

/// Place players by the host's per-player team index
pub fn create_manual_teams(
    player_ids: &[PlayerId],
    team_count: usize,
    assignments: &HashMap<PlayerId, usize>,
) -> GameResult<Vec<SecretTeam>> {
    check_team_count(team_count)?;

    let mut teams = empty_teams(team_count);
    for id in player_ids {
        let idx = assignments
            .get(id)
            .copied()
            .filter(|idx| *idx < team_count)
            .unwrap_or(0);
        teams[idx].player_ids.push(id.clone());
    }

    validate_teams(&teams, player_ids.len())?;
    Ok(teams)
}

pub fn build_teams<R: RandomSource + ?Sized>(
    player_ids: &[PlayerId],
    team_count: usize,
    assignment: &TeamAssignment,
    rng: &mut R,
) -> GameResult<Vec<SecretTeam>> {
    match assignment {
        TeamAssignment::Random => create_teams(player_ids, team_count, rng),
        TeamAssignment::Manual { teams } => create_manual_teams(player_ids, team_count, teams),
    }
}

/// No team may be empty; with 4+ players nobody plays alone
pub fn validate_teams(teams: &[SecretTeam], player_count: usize) -> GameResult<()> {
    if teams.iter().any(|t| t.player_ids.is_empty()) {
        return Err(GameError::EmptyTeam);
    }
    if player_count >= 4 && teams.iter().any(|t| t.player_ids.len() == 1) {
        return Err(GameError::SoloTeam);
    }
    Ok(())
}

/// Give every team without an operator a random member
pub fn assign_missing_operators<R: RandomSource + ?Sized>(teams: &mut [SecretTeam], rng: &mut R) {
    for team in teams.iter_mut().filter(|t| t.operator_id.is_none()) {
        team.operator_id = team.player_ids.choose(rng).cloned();
    }
}

pub fn set_operator(team: &mut SecretTeam, player_id: &str) -> GameResult<()> {
    if !team.player_ids.iter().any(|id| id == player_id) {
        return Err(GameError::PlayerNotFound(player_id.to_string()));
    }
    team.operator_id = Some(player_id.to_string());
    Ok(())
}

pub fn random_operator<R: RandomSource + ?Sized>(team: &mut SecretTeam, rng: &mut R) {
    team.operator_id = team.player_ids.choose(rng).cloned();
}
