use crate::types::*;
use serde::{Deserialize, Serialize};

pub const IMPOSTOR_ALIVE_POINTS: f64 = 2.0;
pub const IMPOSTOR_ELIMINATED_POINTS: f64 = -1.5;
pub const CREW_ALIVE_POINTS: f64 = 1.0;
pub const CREW_ELIMINATED_POINTS: f64 = 0.0;

/// Points for one finished round
pub fn round_points(is_impostor: bool, is_alive: bool) -> f64 {
    match (is_impostor, is_alive) {
        (true, true) => IMPOSTOR_ALIVE_POINTS,
        (true, false) => IMPOSTOR_ELIMINATED_POINTS,
        (false, true) => CREW_ALIVE_POINTS,
        (false, false) => CREW_ELIMINATED_POINTS,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreLine {
    pub player_id: PlayerId,
    pub name: String,
    pub is_impostor: bool,
    pub points: f64,
    pub total: f64,
}

/// Apply the fixed point table to every player and return the per-player lines
pub fn apply_round_scores(players: &mut [ImpostorPlayer]) -> Vec<ScoreLine> {
    players
        .iter_mut()
        .map(|p| {
            let points = round_points(p.is_impostor, p.is_alive);
            p.player.score += points;
            ScoreLine {
                player_id: p.player.id.clone(),
                name: p.player.name.clone(),
                is_impostor: p.is_impostor,
                points,
                total: p.player.score,
            }
        })
        .collect()
}

/// Players ordered by their total as of the start of the round, best first
pub fn leaderboard(players: &[Player]) -> Vec<Player> {
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| b.global_score.total_cmp(&a.global_score));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, impostor: bool, alive: bool, total: f64) -> ImpostorPlayer {
        ImpostorPlayer {
            player: Player {
                id: id.to_string(),
                name: id.to_uppercase(),
                score: total,
                global_score: total,
                emoji: String::new(),
                color: String::new(),
            },
            is_impostor: impostor,
            is_alive: alive,
            word: None,
            hint: None,
            vote: None,
        }
    }

    #[test]
    fn test_point_table() {
        assert_eq!(round_points(true, true), 2.0);
        assert_eq!(round_points(true, false), -1.5);
        assert_eq!(round_points(false, true), 1.0);
        assert_eq!(round_points(false, false), 0.0);
    }

    #[test]
    fn test_scores_accumulate() {
        let mut players = vec![
            player("imp", true, false, 1.0),
            player("crew", false, true, 0.5),
            player("dead", false, false, 3.0),
        ];

        let lines = apply_round_scores(&mut players);

        assert_eq!(lines[0].points, -1.5);
        assert_eq!(players[0].player.score, -0.5);
        assert_eq!(players[1].player.score, 1.5);
        assert_eq!(players[2].player.score, 3.0);
        assert_eq!(lines[2].total, 3.0);

        // a second match keeps adding on top
        apply_round_scores(&mut players);
        assert_eq!(players[1].player.score, 2.5);
        assert_eq!(lines[1].total, 1.5);

        // the ranking total only moves when the next round is dealt
        assert_eq!(players[1].player.global_score, 0.5);
    }

    #[test]
    fn test_every_delta_follows_table() {
        let cases = [(true, true), (true, false), (false, true), (false, false)];
        let mut players: Vec<ImpostorPlayer> = cases
            .iter()
            .enumerate()
            .map(|(i, &(imp, alive))| player(&format!("p{}", i), imp, alive, 10.0))
            .collect();

        let before: Vec<f64> = players.iter().map(|p| p.player.score).collect();
        apply_round_scores(&mut players);

        for (p, prev) in players.iter().zip(before) {
            assert_eq!(
                p.player.score - prev,
                round_points(p.is_impostor, p.is_alive)
            );
        }
    }

    #[test]
    fn test_leaderboard_sorted_desc() {
        let players: Vec<Player> = [("a", 1.0), ("b", 4.5), ("c", -1.5)]
            .iter()
            .map(|(id, g)| player(id, false, true, *g).player)
            .collect();

        let ranked: Vec<String> = leaderboard(&players).into_iter().map(|p| p.id).collect();
        assert_eq!(ranked, vec!["b", "a", "c"]);
    }
}
