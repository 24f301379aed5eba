//! Blake2b-256 hashing and the 32-byte digest types built on it.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

type Blake2b256 = Blake2b<U32>;

/// Hash multiple byte slices in sequence under a domain-separation tag.
pub fn blake2b_256_tagged(domain: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

macro_rules! digest_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Parse the 64-character hex form printed by `Display`.
            pub fn from_hex(s: &str) -> Result<Self, TypesError> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s.trim(), &mut bytes)
                    .map_err(|e| TypesError::InvalidDigest(format!("{s}: {e}")))?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

digest_type!(
    /// Identifies a stored record: hash of its owner, balance and nonce.
    Commitment
);

digest_type!(
    /// Spent marker for a record. Publishing it consumes the record.
    SerialNumber
);

digest_type!(
    /// Identifies one evaluated transition; output nonces derive from it.
    TransitionId
);

impl Commitment {
    /// The serial number that marks this record as spent.
    pub fn serial_number(&self) -> SerialNumber {
        SerialNumber(blake2b_256_tagged(b"veil.serial", &[&self.0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_hash_is_deterministic() {
        let h1 = blake2b_256_tagged(b"tag", &[b"hello", b"veil"]);
        let h2 = blake2b_256_tagged(b"tag", &[b"hello", b"veil"]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn domain_separates() {
        let h1 = blake2b_256_tagged(b"a", &[b"payload"]);
        let h2 = blake2b_256_tagged(b"b", &[b"payload"]);
        assert_ne!(h1, h2);
    }

    #[test]
    fn hex_round_trip() {
        let c = Commitment::new([0xAB; 32]);
        let parsed: Commitment = c.to_string().parse().unwrap();
        assert_eq!(parsed, c);
        assert!(Commitment::from_hex("abcd").is_err());
    }

    #[test]
    fn serial_number_differs_from_commitment() {
        let c = Commitment::new([1; 32]);
        assert_ne!(c.serial_number().as_bytes(), c.as_bytes());
        assert_eq!(c.serial_number(), c.serial_number());
    }
}
