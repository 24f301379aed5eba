//! Ledger snapshots: the full state of the ledger at one height.
//!
//! A snapshot holds every public balance, every stored record and every
//! published serial number. The hash is computed deterministically from that
//! content so a tampered or truncated state file is detected on load.

use serde::{Deserialize, Serialize};

use veil_program::Token;
use veil_types::{Address, SerialNumber};

use crate::error::LedgerError;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over the content below.
    pub hash: [u8; 32],
    /// Accepted transactions at the time of the snapshot.
    pub height: u64,
    /// Public `balance` mapping entries.
    pub accounts: Vec<AccountEntry>,
    /// Every record ever stored, spent or not.
    pub records: Vec<Token>,
    /// Published serial numbers.
    pub spent: Vec<SerialNumber>,
    pub version: u32,
}

/// One entry of the public mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub address: Address,
    pub balance: u64,
}

impl LedgerSnapshot {
    pub fn create(
        accounts: Vec<AccountEntry>,
        records: Vec<Token>,
        spent: Vec<SerialNumber>,
        height: u64,
    ) -> Self {
        let mut snap = Self {
            hash: [0u8; 32],
            height,
            accounts,
            records,
            spent,
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// An empty ledger at height 0.
    pub fn empty() -> Self {
        Self::create(Vec::new(), Vec::new(), Vec::new(), 0)
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update((self.accounts.len() as u64).to_le_bytes());
        for entry in &self.accounts {
            hasher.update(entry.address.to_bytes());
            hasher.update(entry.balance.to_le_bytes());
        }
        hasher.update((self.records.len() as u64).to_le_bytes());
        for record in &self.records {
            hasher.update(record.commitment().as_bytes());
        }
        hasher.update((self.spent.len() as u64).to_le_bytes());
        for serial in &self.spent {
            hasher.update(serial.as_bytes());
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Check the stored hash against the content.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("snapshot serialization should not fail")
    }

    /// Decode and verify a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let snap: Self =
            bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snap.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot version {}",
                snap.version
            )));
        }
        if !snap.verify() {
            return Err(LedgerError::Snapshot("hash mismatch".into()));
        }
        Ok(snap)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}
