//! Nullable seed source: deterministic transition seeds.

use std::sync::Mutex;
use veil_program::{ProgramError, SeedSource};

/// A deterministic seed source for testing.
///
/// Returns pre-configured seeds in order, cycling when exhausted. A counter
/// is mixed into the last byte so repeated cycles never repeat a seed.
pub struct NullSeed {
    seeds: Vec<[u8; 32]>,
    index: Mutex<u64>,
}

impl NullSeed {
    /// Create with a sequence of deterministic seeds.
    pub fn new(seeds: Vec<[u8; 32]>) -> Self {
        assert!(!seeds.is_empty(), "NullSeed needs at least one seed");
        Self {
            seeds,
            index: Mutex::new(0),
        }
    }

    /// Create with a single base seed; every call yields a distinct value.
    pub fn constant(value: [u8; 32]) -> Self {
        Self::new(vec![value])
    }

    /// How many seeds have been handed out.
    pub fn calls(&self) -> u64 {
        *self.index.lock().unwrap()
    }
}

impl Default for NullSeed {
    fn default() -> Self {
        Self::constant([0u8; 32])
    }
}

impl SeedSource for NullSeed {
    fn next_seed(&self) -> Result<[u8; 32], ProgramError> {
        let mut idx = self.index.lock().unwrap();
        let mut seed = self.seeds[(*idx % self.seeds.len() as u64) as usize];
        let round = (*idx / self.seeds.len() as u64).to_le_bytes();
        for (slot, b) in seed[24..].iter_mut().zip(round) {
            *slot ^= b;
        }
        *idx += 1;
        Ok(seed)
    }
}
