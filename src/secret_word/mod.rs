//! Secret Word: teams guess words from their operator's clues.
//!
//! Every round goes `team-reveal → action → result`. In blitz each team gets
//! one timed turn; in duel the teams alternate on a shared word until
//! `match_limit` words have been won.

mod blitz;
mod duel;
mod teams;

pub use blitz::{BlitzTurn, BLITZ_TIMES, SKIPS_PER_TURN};
pub use duel::{DuelRound, DUEL_TIMES};
pub use teams::{
    assign_missing_operators, build_teams, create_manual_teams, create_teams, random_operator,
    set_operator, validate_teams, TeamAssignment, MAX_TEAMS, MIN_TEAMS, TEAM_COLORS, TEAM_NAMES,
};

use crate::error::{GameError, GameResult};
use crate::rng::RandomSource;
use crate::types::*;
use crate::words::draw_word;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player input during a Secret Word match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SecretWordAction {
    SetOperator {
        team_id: TeamId,
        player_id: PlayerId,
    },
    RandomOperator { team_id: TeamId },
    ConfirmTeams,
    Reveal,
    /// Blitz: word guessed. Duel: the active team wins the word.
    Correct,
    Skip,
    StartTimer,
    Pass,
    Reroll,
    NextRound,
}

impl SecretWordAction {
    /// Actions only the host may take; the rest are also open to the active operator
    pub fn host_only(&self) -> bool {
        matches!(
            self,
            SecretWordAction::SetOperator { .. }
                | SecretWordAction::RandomOperator { .. }
                | SecretWordAction::ConfirmTeams
                | SecretWordAction::NextRound
        )
    }
}

pub fn validate_config(config: &SecretWordConfig) -> GameResult<()> {
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&config.team_count) {
        return Err(GameError::InvalidTeamCount(config.team_count));
    }
    let allowed: &[u32] = match config.mode {
        SecretWordMode::Blitz => &BLITZ_TIMES,
        SecretWordMode::Duel => &DUEL_TIMES,
    };
    if !allowed.contains(&config.round_seconds) {
        return Err(GameError::InvalidTimeLimit(config.round_seconds));
    }
    if config.mode == SecretWordMode::Duel && config.match_limit == 0 {
        return Err(GameError::InvalidTimeLimit(0));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretWordMatch {
    pub config: SecretWordConfig,
    pub teams: Vec<SecretTeam>,
    pub phase: SecretWordPhase,
    pub round_no: u32,
    /// Team currently playing (blitz) or starting the next word (duel)
    pub team_idx: usize,
    /// Words won so far this duel round
    pub match_idx: u32,
    pub used_words: Vec<String>,
    pub blitz: Option<BlitzTurn>,
    pub duel: Option<DuelRound>,
}

impl SecretWordMatch {
    pub fn new<R: RandomSource + ?Sized>(
        player_ids: &[PlayerId],
        config: SecretWordConfig,
        assignment: &TeamAssignment,
        rng: &mut R,
    ) -> GameResult<Self> {
        validate_config(&config)?;
        let mut teams = build_teams(player_ids, config.team_count, assignment, rng)?;
        assign_missing_operators(&mut teams, rng);

        tracing::info!(
            mode = ?config.mode,
            teams = teams.len(),
            players = player_ids.len(),
            "Secret Word match created"
        );

        Ok(Self {
            config,
            teams,
            phase: SecretWordPhase::TeamReveal,
            round_no: 1,
            team_idx: 0,
            match_idx: 0,
            used_words: Vec::new(),
            blitz: None,
            duel: None,
        })
    }

    pub fn current_team(&self) -> Option<&SecretTeam> {
        let idx = match (&self.blitz, &self.duel) {
            (Some(turn), _) => turn.team_idx,
            (_, Some(round)) => round.active_team,
            _ => self.team_idx,
        };
        self.teams.get(idx)
    }

    /// Player giving clues right now
    pub fn current_operator(&self) -> Option<&PlayerId> {
        if self.phase != SecretWordPhase::Action {
            return None;
        }
        self.current_team().and_then(|t| t.operator_id.as_ref())
    }

    /// The word on the table, if any
    pub fn current_word(&self) -> Option<&str> {
        match (&self.blitz, &self.duel) {
            (Some(turn), _) => Some(turn.word.as_str()),
            (_, Some(round)) => Some(round.word.as_str()),
            _ => None,
        }
    }

    fn draw<R: RandomSource + ?Sized>(&self, extra: &[String], rng: &mut R) -> String {
        let mut used = self.used_words.clone();
        used.extend_from_slice(extra);
        draw_word(&self.config.selected_categories, &used, rng)
    }

    fn team_mut(&mut self, team_id: &str) -> GameResult<&mut SecretTeam> {
        self.teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| GameError::TeamNotFound(team_id.to_string()))
    }

    fn require_phase(&self, phase: SecretWordPhase) -> GameResult<()> {
        if self.phase != phase {
            return Err(GameError::WrongPhase(self.phase.to_string()));
        }
        Ok(())
    }

    pub fn apply<R: RandomSource + ?Sized>(
        &mut self,
        action: SecretWordAction,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> GameResult<()> {
        match action {
            SecretWordAction::SetOperator { team_id, player_id } => {
                self.require_phase(SecretWordPhase::TeamReveal)?;
                set_operator(self.team_mut(&team_id)?, &player_id)
            }
            SecretWordAction::RandomOperator { team_id } => {
                self.require_phase(SecretWordPhase::TeamReveal)?;
                random_operator(self.team_mut(&team_id)?, rng);
                Ok(())
            }
            SecretWordAction::ConfirmTeams => self.start_action(rng),
            SecretWordAction::Reveal => self.reveal(now),
            SecretWordAction::Correct => self.correct(now, rng),
            SecretWordAction::Skip => self.skip(now, rng),
            SecretWordAction::StartTimer => self.duel_mut()?.start_timer(now),
            SecretWordAction::Pass => self.duel_mut()?.pass(),
            SecretWordAction::Reroll => {
                let round = self.duel.as_ref().ok_or_else(|| self.wrong_phase())?;
                let word = self.draw(&round.shown, rng);
                self.duel_mut()?.reroll(word)
            }
            SecretWordAction::NextRound => self.next_round(),
        }
    }

    fn wrong_phase(&self) -> GameError {
        GameError::WrongPhase(self.phase.to_string())
    }

    fn duel_mut(&mut self) -> GameResult<&mut DuelRound> {
        let phase = self.phase.to_string();
        self.duel.as_mut().ok_or(GameError::WrongPhase(phase))
    }

    fn blitz_mut(&mut self) -> GameResult<&mut BlitzTurn> {
        let phase = self.phase.to_string();
        self.blitz.as_mut().ok_or(GameError::WrongPhase(phase))
    }

    /// Teams are settled; draw the first word and start playing
    fn start_action<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> GameResult<()> {
        self.require_phase(SecretWordPhase::TeamReveal)?;
        assign_missing_operators(&mut self.teams, rng);

        let word = self.draw(&[], rng);
        match self.config.mode {
            SecretWordMode::Blitz => {
                let turn = BlitzTurn::new(self.team_idx, word, self.config.round_seconds);
                self.blitz = Some(turn);
            }
            SecretWordMode::Duel => {
                self.duel = Some(DuelRound::new(
                    word,
                    self.team_idx,
                    self.teams.len(),
                    self.config.round_seconds,
                ));
            }
        }
        self.phase = SecretWordPhase::Action;
        tracing::info!(round = self.round_no, "Secret Word action started");
        Ok(())
    }

    fn reveal(&mut self, now: DateTime<Utc>) -> GameResult<()> {
        self.require_phase(SecretWordPhase::Action)?;
        if let Some(turn) = self.blitz.as_mut() {
            turn.reveal(now);
        } else {
            self.duel_mut()?.reveal();
        }
        Ok(())
    }

    fn correct<R: RandomSource + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> GameResult<()> {
        self.require_phase(SecretWordPhase::Action)?;
        match self.config.mode {
            SecretWordMode::Blitz => {
                let shown = self.blitz_mut()?.shown.clone();
                let next = self.draw(&shown, rng);
                self.blitz_mut()?.guessed(next, now)
            }
            SecretWordMode::Duel => {
                let winner = self.duel_mut()?.win()?;
                self.finish_duel_word(winner, rng);
                Ok(())
            }
        }
    }

    fn skip<R: RandomSource + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> GameResult<()> {
        self.require_phase(SecretWordPhase::Action)?;
        let shown = self.blitz_mut()?.shown.clone();
        let next = self.draw(&shown, rng);
        self.blitz_mut()?.skip(next, now)
    }

    /// Bank the blitz turn and hand over to the next team, or end the round
    fn finish_blitz_turn<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let Some(turn) = self.blitz.take() else {
            return;
        };

        if let Some(team) = self.teams.get_mut(turn.team_idx) {
            team.score += turn.score;
            team.round_score += turn.score;
            team.words_guessed.extend(turn.correct.iter().cloned());
            tracing::info!(team = %team.name, points = turn.score, "Blitz turn finished");
        }
        self.used_words.extend(turn.shown);

        let next = turn.team_idx + 1;
        if next >= self.teams.len() {
            self.phase = SecretWordPhase::Result;
            return;
        }
        self.team_idx = next;
        let word = self.draw(&[], rng);
        self.blitz = Some(BlitzTurn::new(next, word, self.config.round_seconds));
    }

    /// Score a duel word; the winner opens the next one
    fn finish_duel_word<R: RandomSource + ?Sized>(&mut self, winner: usize, rng: &mut R) {
        let Some(round) = self.duel.take() else {
            return;
        };

        if let Some(team) = self.teams.get_mut(winner) {
            team.score += 1;
            team.round_score += 1;
            team.words_guessed.push(round.word.clone());
            tracing::info!(team = %team.name, word = %round.word, "Duel word won");
        }
        self.used_words.extend(round.shown);
        self.match_idx += 1;
        self.team_idx = winner;

        if self.match_idx >= self.config.match_limit {
            self.phase = SecretWordPhase::Result;
            return;
        }
        let word = self.draw(&[], rng);
        self.duel = Some(DuelRound::new(
            word,
            winner,
            self.teams.len(),
            self.config.round_seconds,
        ));
    }

    /// Apply expired timers; returns whether anything changed
    pub fn tick<R: RandomSource + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> bool {
        if self.phase != SecretWordPhase::Action {
            return false;
        }
        if self.blitz.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.finish_blitz_turn(rng);
            return true;
        }
        self.duel.as_mut().is_some_and(|r| r.expire(now))
    }

    /// Back to team-reveal with cleared round scores; totals carry over
    pub fn next_round(&mut self) -> GameResult<()> {
        self.require_phase(SecretWordPhase::Result)?;
        for team in self.teams.iter_mut() {
            team.round_score = 0;
        }
        self.team_idx = 0;
        self.match_idx = 0;
        self.blitz = None;
        self.duel = None;
        self.round_no += 1;
        self.phase = SecretWordPhase::TeamReveal;
        Ok(())
    }

    /// Teams ordered by total score, best first
    pub fn standings(&self) -> Vec<&SecretTeam> {
        let mut sorted: Vec<&SecretTeam> = self.teams.iter().collect();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }
}
