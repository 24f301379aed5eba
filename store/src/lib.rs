//! Abstract storage traits for the veil token ledger.
//!
//! Every storage backend (in-memory for testing, file-backed snapshots)
//! implements these traits. The rest of the codebase depends only on the traits.

pub mod batch;
pub mod error;
pub mod mapping;
pub mod record;

pub use batch::{LedgerStore, StateBatch};
pub use error::StoreError;
pub use mapping::MappingStore;
pub use record::{RecordStore, StoredRecord};
