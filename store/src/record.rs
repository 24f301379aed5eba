//! Record set storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use veil_types::{Address, Commitment, SerialNumber};

/// A stored record: its commitment, the owner index key and the serialized
/// record body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub commitment: Commitment,
    pub owner: Address,
    pub bytes: Vec<u8>,
}

/// Trait for tracking issued records and their spent markers.
///
/// Records are never deleted. Spending a record publishes its serial number;
/// a record is live while its commitment is stored and its serial is absent.
pub trait RecordStore: Send + Sync {
    /// Retrieve a record by commitment.
    fn get_record(&self, commitment: &Commitment) -> Result<StoredRecord, StoreError>;

    /// Check whether a commitment has been stored.
    fn record_exists(&self, commitment: &Commitment) -> Result<bool, StoreError>;

    /// All record commitments issued to an owner, spent or not, in issue order.
    fn records_of(&self, owner: &Address) -> Result<Vec<Commitment>, StoreError>;

    /// Every stored record, in issue order.
    fn iter_records(&self) -> Result<Vec<StoredRecord>, StoreError>;

    /// Check whether a serial number has been published.
    fn is_spent(&self, serial: &SerialNumber) -> Result<bool, StoreError>;

    /// Every published serial number.
    fn spent_serials(&self) -> Result<Vec<SerialNumber>, StoreError>;

    /// Total number of stored records.
    fn record_count(&self) -> Result<u64, StoreError> {
        self.iter_records().map(|r| r.len() as u64)
    }
}
