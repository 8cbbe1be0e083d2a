//! Lobby player list shared by both games

use crate::error::{GameError, GameResult};
use crate::rng::RandomSource;
use crate::types::*;
use rand::seq::IndexedRandom;

pub const MAX_PLAYERS: usize = 20;
pub const MAX_NAME_CHARS: usize = 20;

#[rustfmt::skip]
pub const PLAYER_ICONS: &[&str] = &[
    "🤫", "😁", "👾", "👨‍🚀", "👩‍🚀", "👽", "🤖", "😎", "🫥", "🤔", "🤐", "😶‍🌫️", "😶", "🫠", "🥸",
    "🤥", "🫣", "🧐", "👹", "🫢", "🤓", "😈", "👿", "💀", "👻", "👺", "🧞", "🧟", "🧌", "🕵️",
    "🦹", "🦸", "🧙", "🧛",
];

pub const ICON_COLORS: &[&str] = &[
    "#ff003c", "#3b82f6", "#facc15", "#10b981", "#6d28d9", "#00f2ff", "#ff7b00", "#ff00fb",
    "#00ff40", "#ffffff", "#7f1d1d", "#075985", "#a16207", "#065f46", "#4c1d95", "#0891b2",
    "#b91c1c", "#1d4ed8", "#eab308", "#22c55e",
];

/// Key used for duplicate detection
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    capacity: usize,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PLAYERS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            players: Vec::new(),
            capacity,
        }
    }

    /// The name a new player would get: trimmed, cut to [`MAX_NAME_CHARS`],
    /// non-empty, not taken, and only while there is room left
    pub fn admit(&self, name: &str) -> GameResult<String> {
        let name: String = name.trim().chars().take(MAX_NAME_CHARS).collect();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }

        let normalized = normalize_name(&name);
        if self
            .players
            .iter()
            .any(|p| normalize_name(&p.name) == normalized)
        {
            return Err(GameError::DuplicateName(name));
        }

        if self.players.len() >= self.capacity {
            return Err(GameError::RoomFull(self.capacity));
        }
        Ok(name)
    }

    /// Add a player, rejecting empty and duplicate names.
    ///
    /// An emoji and color not yet taken in this roster are assigned when possible.
    pub fn add_player<R: RandomSource + ?Sized>(
        &mut self,
        name: &str,
        rng: &mut R,
    ) -> GameResult<Player> {
        let name = self.admit(name)?;
        let emoji = self.pick_unused(PLAYER_ICONS, |p| &p.emoji, rng);
        let color = self.pick_unused(ICON_COLORS, |p| &p.color, rng);

        let player = Player {
            id: ulid::Ulid::new().to_string(),
            name,
            score: 0.0,
            global_score: 0.0,
            emoji,
            color,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    fn pick_unused<R: RandomSource + ?Sized>(
        &self,
        palette: &[&'static str],
        field: impl Fn(&Player) -> &String,
        rng: &mut R,
    ) -> String {
        let free: Vec<&'static str> = palette
            .iter()
            .copied()
            .filter(|candidate| !self.players.iter().any(|p| field(p).as_str() == *candidate))
            .collect();
        let choice = free.choose(rng).or_else(|| palette.choose(rng));
        choice.map(|s| s.to_string()).unwrap_or_default()
    }

    pub fn remove(&mut self, id: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy running totals back from a match; in the lobby the ranking
    /// total is the running total
    pub fn sync_scores<'a>(&mut self, results: impl IntoIterator<Item = &'a Player>) {
        for result in results {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == result.id) {
                player.score = result.score;
                player.global_score = result.score;
            }
        }
    }
}
