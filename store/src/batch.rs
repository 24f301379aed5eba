//! Write batching: groups the effects of one accepted transaction into a
//! single atomic commit.
//!
//! A batch is built up in memory while the transaction is validated and its
//! finalize step runs. Nothing touches the store until
//! [`LedgerStore::commit`]; dropping the batch discards every operation.

use crate::{MappingStore, RecordStore, StoreError, StoredRecord};
use veil_types::{Address, SerialNumber};

/// Pending writes for one transaction.
#[derive(Clone, Debug, Default)]
pub struct StateBatch {
    /// Final value per touched mapping key, in first-write order.
    pub mapping_writes: Vec<(Address, u64)>,
    /// Records issued by the transaction.
    pub new_records: Vec<StoredRecord>,
    /// Serial numbers of the records the transaction consumed.
    pub spent: Vec<SerialNumber>,
}

impl StateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping write, replacing an earlier write to the same key.
    pub fn put_mapping(&mut self, key: &Address, value: u64) {
        match self.mapping_writes.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.mapping_writes.push((key.clone(), value)),
        }
    }

    /// The value this batch will write for `key`, if any.
    pub fn mapping_value(&self, key: &Address) -> Option<u64> {
        self.mapping_writes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn put_record(&mut self, record: StoredRecord) {
        self.new_records.push(record);
    }

    pub fn spend(&mut self, serial: SerialNumber) {
        self.spent.push(serial);
    }

    pub fn is_empty(&self) -> bool {
        self.mapping_writes.is_empty() && self.new_records.is_empty() && self.spent.is_empty()
    }
}

/// A store that can apply a [`StateBatch`] atomically.
pub trait LedgerStore: MappingStore + RecordStore {
    /// Apply every write in the batch or none of them, and advance the
    /// accepted-transaction height by one.
    ///
    /// Fails with [`StoreError::Duplicate`] if a serial number in the batch
    /// is already spent or a record commitment already exists.
    fn commit(&self, batch: StateBatch) -> Result<(), StoreError>;

    /// Number of committed batches.
    fn height(&self) -> Result<u64, StoreError>;

    /// Load a batch into an empty store and set its height directly.
    /// Used to rebuild state from a snapshot.
    fn restore(&self, batch: StateBatch, height: u64) -> Result<(), StoreError>;
}
