//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies (storage, randomness) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests. The in-memory
//! store is also what the CLI loads snapshots into.

pub mod random;
pub mod store;

pub use random::NullSeed;
pub use store::NullStore;
