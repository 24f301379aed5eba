//! Execution environment for the veil token program.
//!
//! Transitions are evaluated without shared state; the [`Ledger`] then
//! validates their inputs against the record set, applies any finalize step
//! to the public mapping and commits the result as one unit. A rejected
//! transaction leaves no trace.

pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod transaction;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use snapshot::{AccountEntry, LedgerSnapshot};
pub use transaction::{Receipt, Transaction};
