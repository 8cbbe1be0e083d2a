use crate::error::{GameError, GameResult};
use crate::rng::RandomSource;
use crate::types::*;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

pub const MIN_PLAYERS: usize = 3;

/// Rounds of impostor history that influence the next pick
const HISTORY_DEPTH: usize = 2;

/// Largest impostor count offered for a lobby size
pub fn max_impostors(player_count: usize) -> usize {
    if player_count >= 6 {
        3
    } else if player_count >= 4 {
        2
    } else {
        1
    }
}

pub fn validate_impostor_count(player_count: usize, requested: usize) -> GameResult<()> {
    if player_count < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers {
            required: MIN_PLAYERS,
            actual: player_count,
        });
    }

    let max = max_impostors(player_count);
    if requested == 0 || requested > max || requested >= player_count {
        return Err(GameError::InvalidImpostorCount {
            requested,
            players: player_count,
            max,
        });
    }
    Ok(())
}

/// Impostor ids of the most recent rounds, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImpostorHistory {
    rounds: VecDeque<Vec<PlayerId>>,
}

impl ImpostorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, impostors: Vec<PlayerId>) {
        self.rounds.push_back(impostors);
        while self.rounds.len() > HISTORY_DEPTH {
            self.rounds.pop_front();
        }
    }

    pub fn rounds(&self) -> impl Iterator<Item = &Vec<PlayerId>> {
        self.rounds.iter()
    }

    /// Players who were impostor in each of the last two rounds
    pub fn blocked(&self) -> Vec<PlayerId> {
        let mut count: HashMap<&PlayerId, usize> = HashMap::new();
        for id in self.rounds.iter().flatten() {
            *count.entry(id).or_insert(0) += 1;
        }
        count
            .into_iter()
            .filter(|(_, c)| *c >= HISTORY_DEPTH)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Choose `count` impostors uniformly at random.
///
/// Players who were impostor in both of the last two rounds sit this one out
/// unless that would leave fewer than `count` candidates.
pub fn pick_impostors<R: RandomSource + ?Sized>(
    player_ids: &[PlayerId],
    count: usize,
    history: &ImpostorHistory,
    rng: &mut R,
) -> Vec<PlayerId> {
    let blocked = history.blocked();
    let candidates: Vec<PlayerId> = player_ids
        .iter()
        .filter(|id| !blocked.contains(*id))
        .cloned()
        .collect();

    let mut pool = if candidates.len() >= count {
        candidates
    } else {
        player_ids.to_vec()
    };

    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Pick who opens the discussion, skipping impostors unless they may start
pub fn choose_starting_player<R: RandomSource + ?Sized>(
    players: &[ImpostorPlayer],
    impostor_can_start: bool,
    rng: &mut R,
) -> Option<PlayerId> {
    let eligible: Vec<&ImpostorPlayer> = players
        .iter()
        .filter(|p| p.is_alive && (impostor_can_start || !p.is_impostor))
        .collect();
    eligible.choose(rng).map(|p| p.id().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[test]
    fn test_max_impostors() {
        assert_eq!(max_impostors(3), 1);
        assert_eq!(max_impostors(4), 2);
        assert_eq!(max_impostors(5), 2);
        assert_eq!(max_impostors(6), 3);
        assert_eq!(max_impostors(20), 3);
    }

    #[test]
    fn test_validate_impostor_count() {
        assert!(validate_impostor_count(3, 1).is_ok());
        assert!(validate_impostor_count(6, 3).is_ok());
        assert!(matches!(
            validate_impostor_count(2, 1),
            Err(GameError::NotEnoughPlayers { .. })
        ));
        assert!(matches!(
            validate_impostor_count(3, 2),
            Err(GameError::InvalidImpostorCount { .. })
        ));
        assert!(validate_impostor_count(5, 0).is_err());
    }

    #[test]
    fn test_picks_requested_count_of_distinct_players() {
        let players = ids(8);
        let history = ImpostorHistory::new();
        for _ in 0..200 {
            let picked = pick_impostors(&players, 3, &history, &mut rand::rng());
            assert_eq!(picked.len(), 3);
            let mut unique = picked.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 3);
            assert!(picked.iter().all(|id| players.contains(id)));
        }
    }

    #[test]
    fn test_history_keeps_last_two_rounds() {
        let mut history = ImpostorHistory::new();
        history.record(vec!["a".into()]);
        history.record(vec!["b".into()]);
        history.record(vec!["c".into()]);

        let rounds: Vec<_> = history.rounds().cloned().collect();
        assert_eq!(rounds, vec![vec!["b".to_string()], vec!["c".to_string()]]);
    }

    #[test]
    fn test_blocked_requires_both_rounds() {
        let mut history = ImpostorHistory::new();
        history.record(vec!["a".into(), "b".into()]);
        history.record(vec!["a".into(), "c".into()]);
        assert_eq!(history.blocked(), vec!["a".to_string()]);
    }

    #[test]
    fn test_never_three_rounds_in_a_row() {
        let players = ids(5);
        let mut history = ImpostorHistory::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut previous: Vec<Vec<PlayerId>> = Vec::new();

        for _ in 0..300 {
            let picked = pick_impostors(&players, 1, &history, &mut rng);
            if previous.len() >= 2 {
                let last_two = &previous[previous.len() - 2..];
                let streak = last_two.iter().all(|round| round.contains(&picked[0]));
                assert!(!streak, "{} was impostor three rounds in a row", picked[0]);
            }
            history.record(picked.clone());
            previous.push(picked);
        }
    }

    #[test]
    fn test_restriction_dropped_when_pool_too_small() {
        let players = ids(3);
        let mut history = ImpostorHistory::new();
        history.record(vec!["p0".into(), "p1".into()]);
        history.record(vec!["p0".into(), "p1".into()]);

        // Only p2 is unblocked but two impostors are needed
        let picked = pick_impostors(&players, 2, &history, &mut StdRng::seed_from_u64(1));
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_impostor_distribution_is_spread() {
        let players = ids(4);
        let history = ImpostorHistory::new();
        let mut counts: HashMap<PlayerId, u32> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..4000 {
            for id in pick_impostors(&players, 1, &history, &mut rng) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        // Each player should be picked roughly a quarter of the time
        for id in &players {
            let n = counts.get(id).copied().unwrap_or(0);
            assert!((800..1200).contains(&n), "{} picked {} times", id, n);
        }
    }

    #[test]
    fn test_starting_player_respects_impostor_rule() {
        let make = |id: &str, impostor: bool| ImpostorPlayer {
            player: Player {
                id: id.to_string(),
                name: id.to_uppercase(),
                score: 0.0,
                global_score: 0.0,
                emoji: String::new(),
                color: String::new(),
            },
            is_impostor: impostor,
            is_alive: true,
            word: None,
            hint: None,
            vote: None,
        };
        let players = vec![make("a", true), make("b", false), make("c", false)];
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..100 {
            let starter = choose_starting_player(&players, false, &mut rng).unwrap();
            assert_ne!(starter, "a");
        }
    }
}
