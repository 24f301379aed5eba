//! Fundamental types for the veil token ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, field elements, and the Blake2b digests that identify
//! records, spent markers and transitions.

pub mod address;
pub mod error;
pub mod field;
pub mod hash;

pub use address::Address;
pub use error::TypesError;
pub use field::Field;
pub use hash::{blake2b_256_tagged, Commitment, SerialNumber, TransitionId};
