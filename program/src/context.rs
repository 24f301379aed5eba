//! Execution context: who is calling, and the seed that makes their
//! outputs unique.

use veil_types::{blake2b_256_tagged, Address, TransitionId};

use crate::error::ProgramError;

/// Source of per-transition seeds.
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> Result<[u8; 32], ProgramError>;
}

/// Seeds drawn from the operating system's random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSeed;

impl SeedSource for OsSeed {
    fn next_seed(&self) -> Result<[u8; 32], ProgramError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(|e| ProgramError::Entropy(e.to_string()))?;
        Ok(seed)
    }
}

/// The caller identity (`self.caller`) plus a seed for one transition.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    pub caller: Address,
    pub seed: [u8; 32],
}

impl ExecutionContext {
    pub fn new(caller: Address, seed: [u8; 32]) -> Self {
        Self { caller, seed }
    }

    /// Draw a fresh seed from `source`.
    pub fn with_source(caller: Address, source: &dyn SeedSource) -> Result<Self, ProgramError> {
        Ok(Self::new(caller, source.next_seed()?))
    }
}

/// Accumulates the public description of a transition and hashes it into a
/// [`TransitionId`].
pub(crate) struct Transcript {
    bytes: Vec<u8>,
}

impl Transcript {
    pub(crate) fn new(function: &str, ctx: &ExecutionContext) -> Self {
        let mut t = Self { bytes: Vec::with_capacity(128) };
        t.absorb(function.as_bytes());
        t.absorb(&ctx.caller.to_bytes());
        t.absorb(&ctx.seed);
        t
    }

    /// Append a length-prefixed item.
    pub(crate) fn absorb(&mut self, item: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(&(item.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(item);
        self
    }

    pub(crate) fn finish(&self) -> TransitionId {
        TransitionId::new(blake2b_256_tagged(b"veil.transition", &[&self.bytes]))
    }
}

/// Nonce of output `index` of transition `id`.
pub(crate) fn output_nonce(id: &TransitionId, index: u16) -> [u8; 32] {
    blake2b_256_tagged(b"veil.nonce", &[id.as_bytes(), &index.to_le_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(seed: u8) -> ExecutionContext {
        ExecutionContext::new(Address::from_bytes(&[1; 32]), [seed; 32])
    }

    #[test]
    fn transcript_depends_on_seed_and_args() {
        let a = Transcript::new("mint", &ctx(1)).absorb(b"100").finish();
        let b = Transcript::new("mint", &ctx(2)).absorb(b"100").finish();
        let c = Transcript::new("mint", &ctx(1)).absorb(b"101").finish();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, Transcript::new("mint", &ctx(1)).absorb(b"100").finish());
    }

    #[test]
    fn length_prefix_prevents_ambiguity() {
        let a = Transcript::new("f", &ctx(1)).absorb(b"ab").absorb(b"c").finish();
        let b = Transcript::new("f", &ctx(1)).absorb(b"a").absorb(b"bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn output_nonces_differ_per_slot() {
        let id = Transcript::new("join", &ctx(3)).finish();
        assert_ne!(output_nonce(&id, 0), output_nonce(&id, 1));
    }

    #[test]
    fn os_seed_produces_distinct_values() {
        let a = OsSeed.next_seed().unwrap();
        let b = OsSeed.next_seed().unwrap();
        assert_ne!(a, b);
    }
}
