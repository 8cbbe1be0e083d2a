// Public API for integration tests and potential library usage

pub mod error;
pub mod impostor;
pub mod protocol;
pub mod rng;
pub mod roster;
pub mod secret_word;
pub mod state;
pub mod types;
pub mod words;
pub mod ws;

// Server plumbing
pub mod abuse;
pub mod api;
pub mod broadcast;
pub mod config;
