//! Public mapping storage trait.

use crate::StoreError;
use veil_types::Address;

/// Trait for the public `balance` mapping: address → public balance.
///
/// An absent key is distinct from a stored zero. Callers that want the
/// default-to-zero read use [`MappingStore::get_or_use`].
pub trait MappingStore: Send + Sync {
    /// Read the stored value, `None` if the key was never written.
    fn get(&self, key: &Address) -> Result<Option<u64>, StoreError>;

    /// Iterate over all entries, returning (address, value) pairs.
    fn entries(&self) -> Result<Vec<(Address, u64)>, StoreError>;

    /// Read the stored value or fall back to `default` when absent.
    fn get_or_use(&self, key: &Address, default: u64) -> Result<u64, StoreError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Check whether the key has ever been written.
    fn contains(&self, key: &Address) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}
