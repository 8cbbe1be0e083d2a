//! Pluggable randomness.
//!
//! Every random decision in the games goes through [`RandomSource`] so that a
//! caller can swap the OS-seeded generator for a seeded one and get
//! reproducible matches. Any `rand` generator already is a `RandomSource`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Rng {}

impl<R: Rng + ?Sized> RandomSource for R {}

/// Generator for a new room: seeded when a seed is configured, OS entropy otherwise
pub fn room_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
