use crate::error::{GameError, GameResult};
use crate::types::PlayerId;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_VOTE_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VotingStyle {
    /// One voter at a time on a shared device, each with their own budget
    Sequential,
    /// Everyone votes at once; every budget starts when voting opens
    Simultaneous,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ballot {
    pub voter: PlayerId,
    /// `None` is an abstention, including timeouts
    pub target: Option<PlayerId>,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VotingRound {
    pub style: VotingStyle,
    /// Alive players in voting order
    pub voters: Vec<PlayerId>,
    pub ballots: Vec<Ballot>,
    pub seconds_per_voter: u32,
    /// Deadline of the current voter (sequential) or of everyone (simultaneous)
    pub deadline: DateTime<Utc>,
}

impl VotingRound {
    pub fn open(
        style: VotingStyle,
        voters: Vec<PlayerId>,
        seconds_per_voter: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            style,
            voters,
            ballots: Vec::new(),
            seconds_per_voter,
            deadline: now + TimeDelta::seconds(i64::from(seconds_per_voter)),
        }
    }

    fn budget(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.seconds_per_voter))
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.ballots.iter().any(|b| b.voter == voter)
    }

    /// Whose turn it is on a shared device
    pub fn current_voter(&self) -> Option<&PlayerId> {
        match self.style {
            VotingStyle::Sequential => self.voters.get(self.ballots.len()),
            VotingStyle::Simultaneous => None,
        }
    }

    pub fn pending_voters(&self) -> Vec<PlayerId> {
        self.voters
            .iter()
            .filter(|v| !self.has_voted(v))
            .cloned()
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.ballots.len() >= self.voters.len()
    }

    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    pub fn cast(
        &mut self,
        voter: &str,
        target: Option<PlayerId>,
        now: DateTime<Utc>,
    ) -> GameResult<()> {
        if !self.voters.iter().any(|v| v == voter) {
            return Err(GameError::NotYourTurn(voter.to_string()));
        }
        if self.has_voted(voter) {
            return Err(GameError::AlreadyVoted(voter.to_string()));
        }
        if let Some(current) = self.current_voter() {
            if current != voter {
                return Err(GameError::NotYourTurn(voter.to_string()));
            }
        }
        if let Some(ref target) = target {
            if target == voter || !self.voters.contains(target) {
                return Err(GameError::InvalidVoteTarget(target.clone()));
            }
        }

        self.ballots.push(Ballot {
            voter: voter.to_string(),
            target,
            timed_out: false,
        });
        if self.style == VotingStyle::Sequential {
            self.deadline = now + self.budget();
        }
        Ok(())
    }

    /// Record abstentions for every voter whose budget ran out.
    /// Returns the voters that timed out.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<PlayerId> {
        let mut expired = Vec::new();
        if self.is_finished() || now < self.deadline {
            return expired;
        }

        match self.style {
            VotingStyle::Sequential => {
                if let Some(voter) = self.current_voter().cloned() {
                    self.ballots.push(Ballot {
                        voter: voter.clone(),
                        target: None,
                        timed_out: true,
                    });
                    expired.push(voter);
                    self.deadline = now + self.budget();
                }
            }
            VotingStyle::Simultaneous => {
                for voter in self.pending_voters() {
                    self.ballots.push(Ballot {
                        voter: voter.clone(),
                        target: None,
                        timed_out: true,
                    });
                    expired.push(voter);
                }
            }
        }
        expired
    }

    pub fn tally(&self) -> VoteTally {
        let mut counts: HashMap<PlayerId, u32> = HashMap::new();
        let mut abstentions = 0;
        for ballot in &self.ballots {
            match &ballot.target {
                Some(target) => *counts.entry(target.clone()).or_insert(0) += 1,
                None => abstentions += 1,
            }
        }
        VoteTally {
            eliminated: eliminated_candidate(&counts),
            counts,
            abstentions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteTally {
    pub counts: HashMap<PlayerId, u32>,
    pub abstentions: u32,
    pub eliminated: Option<PlayerId>,
}

/// The candidate with strictly the most votes; ties and zero votes eliminate nobody
pub fn eliminated_candidate(counts: &HashMap<PlayerId, u32>) -> Option<PlayerId> {
    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return None;
    }

    let mut leaders = counts.iter().filter(|(_, c)| **c == max);
    let (leader, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(leader.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voters(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn counts(pairs: &[(&str, u32)]) -> HashMap<PlayerId, u32> {
        pairs.iter().map(|(id, c)| (id.to_string(), *c)).collect()
    }

    #[test]
    fn test_clear_majority_is_eliminated() {
        let result = eliminated_candidate(&counts(&[("A", 3), ("B", 1), ("C", 1)]));
        assert_eq!(result, Some("A".to_string()));
    }

    #[test]
    fn test_tie_eliminates_nobody() {
        assert_eq!(eliminated_candidate(&counts(&[("A", 2), ("B", 2)])), None);
    }

    #[test]
    fn test_no_votes_eliminates_nobody() {
        assert_eq!(eliminated_candidate(&HashMap::new()), None);
        assert_eq!(eliminated_candidate(&counts(&[("A", 0)])), None);
    }

    #[test]
    fn test_simultaneous_round() {
        let now = Utc::now();
        let mut round =
            VotingRound::open(VotingStyle::Simultaneous, voters(&["a", "b", "c"]), 60, now);

        round.cast("b", Some("a".into()), now).unwrap();
        round.cast("a", Some("b".into()), now).unwrap();
        assert!(!round.is_finished());
        round.cast("c", Some("a".into()), now).unwrap();
        assert!(round.is_finished());

        let tally = round.tally();
        assert_eq!(tally.counts.get("a"), Some(&2));
        assert_eq!(tally.eliminated, Some("a".to_string()));
    }

    #[test]
    fn test_invalid_votes_rejected() {
        let now = Utc::now();
        let mut round =
            VotingRound::open(VotingStyle::Simultaneous, voters(&["a", "b", "c"]), 60, now);

        assert!(matches!(
            round.cast("a", Some("a".into()), now),
            Err(GameError::InvalidVoteTarget(_))
        ));
        assert!(matches!(
            round.cast("a", Some("ghost".into()), now),
            Err(GameError::InvalidVoteTarget(_))
        ));
        assert!(matches!(
            round.cast("ghost", None, now),
            Err(GameError::NotYourTurn(_))
        ));

        round.cast("a", None, now).unwrap();
        assert!(matches!(
            round.cast("a", Some("b".into()), now),
            Err(GameError::AlreadyVoted(_))
        ));
    }

    #[test]
    fn test_sequential_order_enforced() {
        let now = Utc::now();
        let mut round = VotingRound::open(VotingStyle::Sequential, voters(&["a", "b"]), 60, now);

        assert_eq!(round.current_voter(), Some(&"a".to_string()));
        assert!(matches!(
            round.cast("b", Some("a".into()), now),
            Err(GameError::NotYourTurn(_))
        ));
        round.cast("a", Some("b".into()), now).unwrap();
        assert_eq!(round.current_voter(), Some(&"b".to_string()));
    }

    #[test]
    fn test_sequential_timeout_moves_to_next_voter() {
        let start = Utc::now();
        let mut round =
            VotingRound::open(VotingStyle::Sequential, voters(&["a", "b", "c"]), 60, start);

        assert!(round.expire(start + TimeDelta::seconds(30)).is_empty());

        let later = start + TimeDelta::seconds(60);
        assert_eq!(round.expire(later), vec!["a".to_string()]);
        assert_eq!(round.current_voter(), Some(&"b".to_string()));
        assert_eq!(round.seconds_left(later), 60);

        // b gets a fresh budget
        assert!(round.expire(later + TimeDelta::seconds(59)).is_empty());
        assert_eq!(round.ballots[0].target, None);
        assert!(round.ballots[0].timed_out);
    }

    #[test]
    fn test_simultaneous_timeout_nulls_everyone_left() {
        let start = Utc::now();
        let mut round = VotingRound::open(
            VotingStyle::Simultaneous,
            voters(&["a", "b", "c"]),
            60,
            start,
        );
        round.cast("a", Some("b".into()), start).unwrap();

        let expired = round.expire(start + TimeDelta::seconds(61));
        assert_eq!(expired.len(), 2);
        assert!(round.is_finished());

        let tally = round.tally();
        assert_eq!(tally.abstentions, 2);
        assert_eq!(tally.eliminated, Some("b".to_string()));
    }
}
