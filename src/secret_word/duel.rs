use crate::error::{GameError, GameResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Answer timers offered for duel
pub const DUEL_TIMES: [u32; 3] = [15, 30, 60];

/// Teams taking turns at one shared word
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuelRound {
    pub word: String,
    pub active_team: usize,
    /// Words drawn for this round, including rerolled ones
    pub shown: Vec<String>,
    pub revealed: bool,
    pub deadline: Option<DateTime<Utc>>,
    team_count: usize,
    seconds: u32,
}

impl DuelRound {
    pub fn new(word: String, active_team: usize, team_count: usize, seconds: u32) -> Self {
        Self {
            shown: vec![word.clone()],
            word,
            active_team,
            revealed: false,
            deadline: None,
            team_count,
            seconds,
        }
    }

    pub fn timer_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// The operator has given the clue
    pub fn start_timer(&mut self, now: DateTime<Utc>) -> GameResult<()> {
        if !self.revealed {
            return Err(GameError::WordNotRevealed);
        }
        if self.timer_running() {
            return Err(GameError::TimerRunning);
        }
        self.deadline = Some(now + TimeDelta::seconds(i64::from(self.seconds)));
        Ok(())
    }

    /// Missed; the next team tries the same word
    pub fn pass(&mut self) -> GameResult<()> {
        if !self.timer_running() {
            return Err(GameError::TimerNotStarted);
        }
        self.active_team = (self.active_team + 1) % self.team_count.max(1);
        self.deadline = None;
        self.revealed = false;
        Ok(())
    }

    pub fn reroll(&mut self, word: String) -> GameResult<()> {
        if self.timer_running() {
            return Err(GameError::TimerRunning);
        }
        self.shown.push(word.clone());
        self.word = word;
        self.revealed = false;
        Ok(())
    }

    /// The active team guessed; returns its index
    pub fn win(&self) -> GameResult<usize> {
        if !self.timer_running() {
            return Err(GameError::TimerNotStarted);
        }
        Ok(self.active_team)
    }

    /// Pass the turn when the answer timer ran out
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => self.pass().is_ok(),
            _ => false,
        }
    }

    pub fn seconds_left(&self, now: DateTime<Utc>) -> u32 {
        match self.deadline {
            Some(d) => u32::try_from((d - now).num_seconds().max(0)).unwrap_or(0),
            None => self.seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_needs_reveal() {
        let now = Utc::now();
        let mut round = DuelRound::new("Moon".into(), 0, 2, 15);
        assert_eq!(round.start_timer(now), Err(GameError::WordNotRevealed));
        round.reveal();
        round.start_timer(now).unwrap();
        assert_eq!(round.start_timer(now), Err(GameError::TimerRunning));
        assert_eq!(round.seconds_left(now + TimeDelta::seconds(5)), 10);
    }

    #[test]
    fn test_pass_rotates_teams() {
        let now = Utc::now();
        let mut round = DuelRound::new("Moon".into(), 2, 3, 15);
        round.reveal();
        round.start_timer(now).unwrap();
        round.pass().unwrap();
        assert_eq!(round.active_team, 0);
        assert!(!round.revealed);
        assert!(!round.timer_running());
        assert_eq!(round.pass(), Err(GameError::TimerNotStarted));
    }

    #[test]
    fn test_timeout_passes_turn() {
        let now = Utc::now();
        let mut round = DuelRound::new("Moon".into(), 0, 2, 15);
        round.reveal();
        round.start_timer(now).unwrap();
        assert!(!round.expire(now + TimeDelta::seconds(14)));
        assert!(round.expire(now + TimeDelta::seconds(15)));
        assert_eq!(round.active_team, 1);
    }

    #[test]
    fn test_reroll_only_before_timer() {
        let now = Utc::now();
        let mut round = DuelRound::new("Moon".into(), 0, 2, 15);
        round.reveal();
        round.reroll("Sun".into()).unwrap();
        assert_eq!(round.word, "Sun");
        assert!(!round.revealed);

        round.reveal();
        round.start_timer(now).unwrap();
        assert_eq!(round.reroll("Star".into()), Err(GameError::TimerRunning));
        assert_eq!(round.win(), Ok(0));
    }
}
