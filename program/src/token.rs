//! Token record representation.

use serde::{Deserialize, Serialize};
use veil_types::{blake2b_256_tagged, Address, Commitment, SerialNumber};

use crate::error::ProgramError;

/// A private balance record.
///
/// Records are never mutated: every transition that uses one consumes it
/// and issues fresh records in its place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The only party allowed to spend this record.
    pub owner: Address,

    /// Private balance carried by the record.
    pub balance: u64,

    /// Uniqueness nonce, derived from the issuing transition and output slot.
    pub nonce: [u8; 32],
}

impl Token {
    /// Hash of owner, balance and nonce. Identifies the record in storage.
    pub fn commitment(&self) -> Commitment {
        Commitment::new(blake2b_256_tagged(
            b"veil.commitment",
            &[
                &self.owner.to_bytes(),
                &self.balance.to_le_bytes(),
                &self.nonce,
            ],
        ))
    }

    /// The spent marker published when this record is consumed.
    pub fn serial_number(&self) -> SerialNumber {
        self.commitment().serial_number()
    }

    /// Serialize the record body (bincode).
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("token serialization should not fail")
    }

    /// Deserialize a record body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        bincode::deserialize(bytes).map_err(|e| ProgramError::MalformedRecord(e.to_string()))
    }
}
