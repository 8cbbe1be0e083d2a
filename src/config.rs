//! Server configuration from the environment

use crate::impostor::DEFAULT_VOTE_SECONDS;
use crate::roster::MAX_PLAYERS;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 7529;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory served as the web client
    pub static_dir: String,
    /// Voting budget per voter
    pub vote_seconds: u32,
    pub max_room_players: usize,
    /// Seeds every room's generator when set
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: "static".to_string(),
            vote_seconds: DEFAULT_VOTE_SECONDS,
            max_room_players: MAX_PLAYERS,
            rng_seed: None,
        }
    }
}

/// Parse an env var, keeping `default` when unset or invalid
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let static_dir = std::env::var("PLAYHOME_STATIC_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.static_dir);

        let vote_seconds = match env_or("PLAYHOME_VOTE_SECONDS", defaults.vote_seconds) {
            0 => {
                tracing::warn!("PLAYHOME_VOTE_SECONDS must be positive, using default");
                DEFAULT_VOTE_SECONDS
            }
            secs => secs,
        };

        let max_room_players = env_or("PLAYHOME_MAX_ROOM_PLAYERS", defaults.max_room_players);
        let max_room_players = max_room_players.clamp(1, MAX_PLAYERS);

        let rng_seed = std::env::var("PLAYHOME_RNG_SEED")
            .ok()
            .and_then(|v| v.trim().parse().ok());

        let config = Self {
            port: env_or("PLAYHOME_PORT", defaults.port),
            static_dir,
            vote_seconds,
            max_room_players,
            rng_seed,
        };

        tracing::info!(
            port = config.port,
            static_dir = %config.static_dir,
            vote_seconds = config.vote_seconds,
            max_room_players = config.max_room_players,
            seeded = config.rng_seed.is_some(),
            "Server config loaded"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "PLAYHOME_PORT",
        "PLAYHOME_STATIC_DIR",
        "PLAYHOME_VOTE_SECONDS",
        "PLAYHOME_MAX_ROOM_PLAYERS",
        "PLAYHOME_RNG_SEED",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        assert_eq!(ServerConfig::from_env(), ServerConfig::default());
    }

    #[test]
    #[serial]
    fn test_reads_env() {
        clear_env();
        std::env::set_var("PLAYHOME_PORT", "8080");
        std::env::set_var("PLAYHOME_STATIC_DIR", "web/dist");
        std::env::set_var("PLAYHOME_VOTE_SECONDS", "30");
        std::env::set_var("PLAYHOME_MAX_ROOM_PLAYERS", "8");
        std::env::set_var("PLAYHOME_RNG_SEED", "42");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, "web/dist");
        assert_eq!(config.vote_seconds, 30);
        assert_eq!(config.max_room_players, 8);
        assert_eq!(config.rng_seed, Some(42));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("PLAYHOME_PORT", "not-a-port");
        std::env::set_var("PLAYHOME_VOTE_SECONDS", "0");
        std::env::set_var("PLAYHOME_MAX_ROOM_PLAYERS", "500");

        let config = ServerConfig::from_env();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.vote_seconds, DEFAULT_VOTE_SECONDS);
        assert_eq!(config.max_room_players, MAX_PLAYERS);
        clear_env();
    }
}
