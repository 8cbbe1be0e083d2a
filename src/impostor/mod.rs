//! Impostor: crew members share a secret word, impostors bluff without it.
//!
//! A match walks through `reveal → discussion → voting → elimination →
//! result`, looping back to discussion until either side wins. Scores are
//! applied once when the match is decided.

mod distribution;
mod score;
mod selection;
mod vote;

pub use distribution::distribute_words;
pub use score::{
    apply_round_scores, leaderboard, round_points, ScoreLine, CREW_ALIVE_POINTS,
    CREW_ELIMINATED_POINTS, IMPOSTOR_ALIVE_POINTS, IMPOSTOR_ELIMINATED_POINTS,
};
pub use selection::{
    choose_starting_player, max_impostors, pick_impostors, validate_impostor_count,
    ImpostorHistory, MIN_PLAYERS,
};
pub use vote::{
    eliminated_candidate, Ballot, VoteTally, VotingRound, VotingStyle, DEFAULT_VOTE_SECONDS,
};

use crate::error::{GameError, GameResult};
use crate::rng::RandomSource;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Ongoing,
    CrewWins,
    ImpostorsWin,
}

/// Decide the match from who is still alive
pub fn outcome(players: &[ImpostorPlayer]) -> Outcome {
    let impostors = players
        .iter()
        .filter(|p| p.is_alive && p.is_impostor)
        .count();
    let crew = players
        .iter()
        .filter(|p| p.is_alive && !p.is_impostor)
        .count();

    if impostors == 0 {
        Outcome::CrewWins
    } else if impostors >= crew {
        Outcome::ImpostorsWin
    } else {
        Outcome::Ongoing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpostorMatch {
    pub config: ImpostorConfig,
    pub players: Vec<ImpostorPlayer>,
    pub phase: ImpostorPhase,
    pub round_no: u32,
    /// The secret word of this round (and its two-word variant)
    pub word: String,
    pub related_word: Option<String>,
    pub who_starts: Option<PlayerId>,
    /// Players who have seen their card (online reveal)
    pub ready: HashSet<PlayerId>,
    pub voting: Option<VotingRound>,
    pub last_tally: Option<VoteTally>,
    /// Who leaves the game when the elimination is confirmed
    pub pending_elimination: Option<PlayerId>,
    pub last_eliminated: Option<PlayerId>,
    pub round_scores: Vec<ScoreLine>,
    pub history: ImpostorHistory,
    pub used_words: Vec<String>,
    pub vote_seconds: u32,
}

impl ImpostorMatch {
    /// Validate the lobby and deal the first round
    pub fn new<R: RandomSource + ?Sized>(
        lobby: &[Player],
        config: ImpostorConfig,
        vote_seconds: u32,
        rng: &mut R,
    ) -> GameResult<Self> {
        validate_impostor_count(lobby.len(), config.how_many_impostors)?;

        let players = lobby
            .iter()
            .map(|p| ImpostorPlayer {
                player: p.clone(),
                is_impostor: false,
                is_alive: true,
                word: None,
                hint: None,
                vote: None,
            })
            .collect();

        let mut game = Self {
            config,
            players,
            phase: ImpostorPhase::Reveal,
            round_no: 1,
            word: String::new(),
            related_word: None,
            who_starts: None,
            ready: HashSet::new(),
            voting: None,
            last_tally: None,
            pending_elimination: None,
            last_eliminated: None,
            round_scores: Vec::new(),
            history: ImpostorHistory::new(),
            used_words: Vec::new(),
            vote_seconds,
        };
        game.deal(rng);
        Ok(game)
    }

    /// Fresh impostors and word for everyone; scores are kept
    fn deal<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id().clone()).collect();
        let impostors = pick_impostors(&ids, self.config.how_many_impostors, &self.history, rng);

        for p in self.players.iter_mut() {
            p.is_impostor = impostors.contains(p.id());
            p.is_alive = true;
            p.vote = None;
            p.player.global_score = p.player.score;
        }

        let entry = distribute_words(&mut self.players, &self.config, &self.used_words, rng);
        self.word = entry.word.to_string();
        self.related_word = self
            .config
            .two_words_mode
            .then(|| entry.related.map(str::to_string))
            .flatten();
        self.used_words.push(self.word.clone());

        self.who_starts = if self.config.who_starts {
            choose_starting_player(&self.players, self.config.impostor_can_start, rng)
        } else {
            None
        };

        self.phase = ImpostorPhase::Reveal;
        self.ready.clear();
        self.voting = None;
        self.last_tally = None;
        self.pending_elimination = None;
        self.last_eliminated = None;
        self.round_scores.clear();

        tracing::debug!(
            round = self.round_no,
            impostors = self.config.how_many_impostors,
            "Impostor round dealt"
        );
    }

    pub fn voting_style(&self) -> VotingStyle {
        match self.config.play_mode {
            PlayMode::SharedDevice => VotingStyle::Sequential,
            PlayMode::Online => VotingStyle::Simultaneous,
        }
    }

    pub fn player(&self, id: &str) -> Option<&ImpostorPlayer> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_alive)
            .map(|p| p.id().clone())
            .collect()
    }

    pub fn outcome(&self) -> Outcome {
        outcome(&self.players)
    }

    /// The match is only decided in the result phase
    pub fn is_over(&self) -> bool {
        self.phase == ImpostorPhase::Result && self.outcome() != Outcome::Ongoing
    }

    pub fn outcome_if_decided(&self) -> Outcome {
        if self.is_over() {
            self.outcome()
        } else {
            Outcome::Ongoing
        }
    }

    fn require_phase(&self, phase: ImpostorPhase) -> GameResult<()> {
        if self.phase != phase {
            return Err(GameError::WrongPhase(self.phase.to_string()));
        }
        Ok(())
    }

    /// Mark a player as having seen their card; returns whether everyone has
    pub fn toggle_ready(&mut self, player_id: &str) -> GameResult<bool> {
        self.require_phase(ImpostorPhase::Reveal)?;
        if self.player(player_id).is_none() {
            return Err(GameError::PlayerNotFound(player_id.to_string()));
        }

        if !self.ready.remove(player_id) {
            self.ready.insert(player_id.to_string());
        }
        Ok(self.all_ready())
    }

    pub fn all_ready(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_alive)
            .all(|p| self.ready.contains(p.id()))
    }

    /// Move to the requested phase if the transition is allowed
    pub fn advance(&mut self, to: ImpostorPhase, now: DateTime<Utc>) -> GameResult<()> {
        use ImpostorPhase::*;

        match (self.phase, to) {
            (Reveal, Discussion) => {
                if self.config.play_mode == PlayMode::Online && !self.all_ready() {
                    return Err(GameError::PlayersNotReady);
                }
            }
            (Discussion, Voting) => {}
            (Voting, Elimination) => {
                if !self.voting.as_ref().is_some_and(VotingRound::is_finished) {
                    return Err(GameError::WrongPhase("voting".to_string()));
                }
            }
            (Elimination, Result) => return self.confirm_elimination(),
            (Result, Discussion) => {
                if self.outcome() != Outcome::Ongoing {
                    return Err(GameError::InvalidTransition {
                        from: self.phase.to_string(),
                        to: to.to_string(),
                    });
                }
            }
            _ => {
                return Err(GameError::InvalidTransition {
                    from: self.phase.to_string(),
                    to: to.to_string(),
                })
            }
        }

        self.enter(to, now);
        Ok(())
    }

    fn enter(&mut self, phase: ImpostorPhase, now: DateTime<Utc>) {
        match phase {
            ImpostorPhase::Discussion => {
                self.voting = None;
                self.last_tally = None;
                self.pending_elimination = None;
                for p in self.players.iter_mut() {
                    p.vote = None;
                }
            }
            ImpostorPhase::Voting => {
                self.voting = Some(VotingRound::open(
                    self.voting_style(),
                    self.alive_ids(),
                    self.vote_seconds,
                    now,
                ));
            }
            ImpostorPhase::Elimination => {
                let tally = self.voting.as_ref().map(VotingRound::tally);
                self.pending_elimination = tally.as_ref().and_then(|t| t.eliminated.clone());
                self.last_tally = tally;
            }
            ImpostorPhase::Reveal | ImpostorPhase::Result => {}
        }
        tracing::info!(round = self.round_no, phase = %phase, "Impostor phase changed");
        self.phase = phase;
    }

    /// Record a vote; the match moves to elimination once everyone has voted
    pub fn cast_vote(
        &mut self,
        voter: &str,
        target: Option<PlayerId>,
        now: DateTime<Utc>,
    ) -> GameResult<()> {
        self.require_phase(ImpostorPhase::Voting)?;
        let voting = self.voting.as_mut().ok_or(GameError::NoActiveGame)?;
        voting.cast(voter, target.clone(), now)?;

        if let Some(p) = self.players.iter_mut().find(|p| p.id() == voter) {
            p.vote = target;
        }
        self.close_voting_if_done(now);
        Ok(())
    }

    /// Whose turn it is when voting on a shared device
    pub fn current_voter(&self) -> Option<&PlayerId> {
        self.voting.as_ref().and_then(VotingRound::current_voter)
    }

    fn close_voting_if_done(&mut self, now: DateTime<Utc>) {
        if self.voting.as_ref().is_some_and(VotingRound::is_finished) {
            self.enter(ImpostorPhase::Elimination, now);
        }
    }

    /// Apply expired voting deadlines; returns whether anything changed
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != ImpostorPhase::Voting {
            return false;
        }
        let Some(voting) = self.voting.as_mut() else {
            return false;
        };

        let expired = voting.expire(now);
        if expired.is_empty() {
            return false;
        }
        tracing::info!(voters = ?expired, "Voting time ran out");
        self.close_voting_if_done(now);
        true
    }

    /// Carry out the tallied (or overridden) elimination and show the result
    pub fn confirm_elimination(&mut self) -> GameResult<()> {
        self.require_phase(ImpostorPhase::Elimination)?;
        let target = self.pending_elimination.take();
        self.finish_elimination(target)
    }

    /// Host override: eliminate `target` (or nobody) regardless of the votes
    pub fn manual_elimination(&mut self, target: Option<PlayerId>) -> GameResult<()> {
        if !matches!(
            self.phase,
            ImpostorPhase::Voting | ImpostorPhase::Elimination
        ) {
            return Err(GameError::WrongPhase(self.phase.to_string()));
        }
        if let Some(ref id) = target {
            if !self.player(id).is_some_and(|p| p.is_alive) {
                return Err(GameError::InvalidVoteTarget(id.clone()));
            }
        }
        self.pending_elimination = None;
        self.finish_elimination(target)
    }

    fn finish_elimination(&mut self, target: Option<PlayerId>) -> GameResult<()> {
        if let Some(ref id) = target {
            let player = self
                .players
                .iter_mut()
                .find(|p| p.id() == id)
                .ok_or_else(|| GameError::PlayerNotFound(id.clone()))?;
            player.is_alive = false;
            self.ready.remove(id);
            tracing::info!(
                player = %player.player.name,
                impostor = player.is_impostor,
                "Player eliminated"
            );
        } else {
            tracing::info!("Nobody eliminated");
        }

        self.last_eliminated = target;
        self.voting = None;
        self.phase = ImpostorPhase::Result;

        if self.outcome() != Outcome::Ongoing && self.round_scores.is_empty() {
            self.round_scores = apply_round_scores(&mut self.players);
            tracing::info!(
                round = self.round_no,
                outcome = ?self.outcome(),
                "Impostor match decided"
            );
        }
        Ok(())
    }

    /// Redraw impostors and word during the reveal; scores are kept
    pub fn reroll<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> GameResult<()> {
        self.require_phase(ImpostorPhase::Reveal)?;
        self.deal(rng);
        Ok(())
    }

    /// Start another round with the same players after the match is decided
    pub fn next_round<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> GameResult<()> {
        if !self.is_over() {
            return Err(GameError::WrongPhase(self.phase.to_string()));
        }
        // The finished round joins the history; rerolled deals never do
        let played = self
            .players
            .iter()
            .filter(|p| p.is_impostor)
            .map(|p| p.id().clone())
            .collect();
        self.history.record(played);

        self.round_no += 1;
        self.deal(rng);
        Ok(())
    }

    /// Lobby players with their current scores
    pub fn standings(&self) -> Vec<Player> {
        leaderboard(
            &self
                .players
                .iter()
                .map(|p| p.player.clone())
                .collect::<Vec<_>>(),
        )
    }
}
