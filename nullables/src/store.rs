//! Nullable store: thread-safe in-memory storage.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use veil_store::{
    LedgerStore, MappingStore, RecordStore, StateBatch, StoreError, StoredRecord,
};
use veil_types::{Address, Commitment, SerialNumber};

#[derive(Default)]
struct State {
    mapping: BTreeMap<Address, u64>,
    records: HashMap<Commitment, StoredRecord>,
    /// Commitments in the order they were stored.
    issued: Vec<Commitment>,
    owner_index: HashMap<Address, Vec<Commitment>>,
    spent: BTreeSet<SerialNumber>,
    height: u64,
}

/// An in-memory mapping + record store.
///
/// All state sits behind one mutex, so [`LedgerStore::commit`] is atomic
/// with respect to every other reader and writer.
pub struct NullStore {
    state: Mutex<State>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Mark a serial number spent directly, bypassing the commit path.
    pub fn insert_spent(&self, serial: SerialNumber) {
        self.state.lock().unwrap().spent.insert(serial);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingStore for NullStore {
    fn get(&self, key: &Address) -> Result<Option<u64>, StoreError> {
        Ok(self.state.lock().unwrap().mapping.get(key).copied())
    }

    fn entries(&self) -> Result<Vec<(Address, u64)>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .mapping
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }
}

impl RecordStore for NullStore {
    fn get_record(&self, commitment: &Commitment) -> Result<StoredRecord, StoreError> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(commitment)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(commitment.to_string()))
    }

    fn record_exists(&self, commitment: &Commitment) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().records.contains_key(commitment))
    }

    fn records_of(&self, owner: &Address) -> Result<Vec<Commitment>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .owner_index
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    fn iter_records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .issued
            .iter()
            .filter_map(|c| state.records.get(c).cloned())
            .collect())
    }

    fn is_spent(&self, serial: &SerialNumber) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().spent.contains(serial))
    }

    fn spent_serials(&self) -> Result<Vec<SerialNumber>, StoreError> {
        Ok(self.state.lock().unwrap().spent.iter().copied().collect())
    }
}

impl State {
    /// Reject the batch if it would spend a serial twice or reissue a record.
    fn check(&self, batch: &StateBatch) -> Result<(), StoreError> {
        for serial in &batch.spent {
            if self.spent.contains(serial) {
                return Err(StoreError::Duplicate(format!("serial {serial}")));
            }
        }
        for record in &batch.new_records {
            if self.records.contains_key(&record.commitment) {
                return Err(StoreError::Duplicate(format!("record {}", record.commitment)));
            }
        }
        Ok(())
    }

    fn apply(&mut self, batch: StateBatch) {
        for (key, value) in batch.mapping_writes {
            self.mapping.insert(key, value);
        }
        self.spent.extend(batch.spent);
        for record in batch.new_records {
            self.owner_index
                .entry(record.owner.clone())
                .or_default()
                .push(record.commitment);
            self.issued.push(record.commitment);
            self.records.insert(record.commitment, record);
        }
    }
}

impl LedgerStore for NullStore {
    fn commit(&self, batch: StateBatch) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check(&batch)?;
        state.apply(batch);
        state.height += 1;
        Ok(())
    }

    fn height(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().height)
    }

    fn restore(&self, batch: StateBatch, height: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.height != 0 || !state.records.is_empty() || !state.mapping.is_empty() {
            return Err(StoreError::Backend("restore into a non-empty store".into()));
        }
        state.check(&batch)?;
        state.apply(batch);
        state.height = height;
        Ok(())
    }
}
