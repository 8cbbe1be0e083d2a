use crate::error::{GameError, GameResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Turn lengths offered for blitz
pub const BLITZ_TIMES: [u32; 3] = [60, 90, 120];
pub const SKIPS_PER_TURN: u32 = 3;

/// One team racing the clock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlitzTurn {
    pub team_idx: usize,
    pub word: String,
    /// Operator has looked at the current word
    pub revealed: bool,
    /// Set by the first reveal
    pub deadline: Option<DateTime<Utc>>,
    pub skips_left: u32,
    pub score: u32,
    pub correct: Vec<String>,
    /// Every word drawn during this turn
    pub shown: Vec<String>,
    seconds: u32,
}

impl BlitzTurn {
    pub fn new(team_idx: usize, word: String, seconds: u32) -> Self {
        Self {
            team_idx,
            shown: vec![word.clone()],
            word,
            revealed: false,
            deadline: None,
            skips_left: SKIPS_PER_TURN,
            score: 0,
            correct: Vec::new(),
            seconds,
        }
    }

    pub fn started(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn reveal(&mut self, now: DateTime<Utc>) {
        self.revealed = true;
        if self.deadline.is_none() {
            self.deadline = Some(now + TimeDelta::seconds(i64::from(self.seconds)));
        }
    }

    fn check_running(&self, now: DateTime<Utc>) -> GameResult<()> {
        match self.deadline {
            None => Err(GameError::TimerNotStarted),
            Some(deadline) if now >= deadline => Err(GameError::WrongPhase("time up".to_string())),
            Some(_) => Ok(()),
        }
    }

    fn next_word(&mut self, word: String) {
        self.shown.push(word.clone());
        self.word = word;
        self.revealed = false;
    }

    /// The team guessed the current word
    pub fn guessed(&mut self, next: String, now: DateTime<Utc>) -> GameResult<()> {
        self.check_running(now)?;
        if !self.revealed {
            return Err(GameError::WordNotRevealed);
        }
        self.score += 1;
        self.correct.push(self.word.clone());
        self.next_word(next);
        Ok(())
    }

    pub fn skip(&mut self, next: String, now: DateTime<Utc>) -> GameResult<()> {
        self.check_running(now)?;
        if self.skips_left == 0 {
            return Err(GameError::NoSkipsLeft);
        }
        self.skips_left -= 1;
        self.next_word(next);
        Ok(())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn seconds_left(&self, now: DateTime<Utc>) -> u32 {
        match self.deadline {
            Some(d) => u32::try_from((d - now).num_seconds().max(0)).unwrap_or(0),
            None => self.seconds,
        }
    }
}
