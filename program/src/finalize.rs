//! Finalize steps: the deferred half of a transition, which mutates the
//! public `balance` mapping.
//!
//! A transition captures its finalize arguments in a [`Pending`] value. The
//! execution environment applies it through a [`FinalizeContext`], which
//! reads through a write buffer onto the committed mapping. Writes only
//! reach the store when the environment commits the buffer, so a failing
//! finalize leaves no trace.

use serde::{Deserialize, Serialize};
use veil_store::{MappingStore, StateBatch};
use veil_types::Address;

use crate::call::Function;
use crate::error::{checked_add, checked_sub, ProgramError};

/// A deferred finalize request, carrying the values captured at transition time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    /// Credit `receiver` with `amount` (absent balance counts as 0).
    TransferPrivateToPublic { receiver: Address, amount: u64 },
    /// Debit `caller` by `amount` (absent balance fails).
    TransferPublicToPrivate { caller: Address, amount: u64 },
    /// Credit `receiver` with freshly minted `amount`.
    MintPublic { receiver: Address, amount: u64 },
    /// Debit `caller`, then credit `receiver`.
    TransferPublic {
        caller: Address,
        receiver: Address,
        amount: u64,
    },
}

impl Pending {
    /// The program function this finalize step belongs to.
    pub fn function(&self) -> Function {
        match self {
            Self::TransferPrivateToPublic { .. } => Function::TransferPrivateToPublic,
            Self::TransferPublicToPrivate { .. } => Function::TransferPublicToPrivate,
            Self::MintPublic { .. } => Function::MintPublic,
            Self::TransferPublic { .. } => Function::TransferPublic,
        }
    }

    /// Net change this step makes to the sum of all public balances.
    pub fn supply_delta(&self) -> i128 {
        match self {
            Self::TransferPrivateToPublic { amount, .. } | Self::MintPublic { amount, .. } => {
                *amount as i128
            }
            Self::TransferPublicToPrivate { amount, .. } => -(*amount as i128),
            Self::TransferPublic { .. } => 0,
        }
    }

    /// Run the finalize step. Every write lands in the context's buffer.
    pub fn apply(&self, ctx: &mut FinalizeContext<'_>) -> Result<(), ProgramError> {
        match self {
            Self::TransferPrivateToPublic { receiver, amount }
            | Self::MintPublic { receiver, amount } => credit(ctx, receiver, *amount),
            Self::TransferPublicToPrivate { caller, amount } => debit(ctx, caller, *amount),
            Self::TransferPublic {
                caller,
                receiver,
                amount,
            } => {
                debit(ctx, caller, *amount)?;
                credit(ctx, receiver, *amount)
            }
        }
    }
}

/// `balance[key] = balance.get_or_use(key, 0) + amount`
fn credit(ctx: &mut FinalizeContext<'_>, key: &Address, amount: u64) -> Result<(), ProgramError> {
    let current = ctx.get_or_use(key, 0)?;
    ctx.set(key, checked_add(current, amount)?);
    Ok(())
}

/// `balance[key] = balance.get(key) - amount`
fn debit(ctx: &mut FinalizeContext<'_>, key: &Address, amount: u64) -> Result<(), ProgramError> {
    let current = ctx.get(key)?;
    ctx.set(key, checked_sub(current, amount)?);
    Ok(())
}

/// Mapping access for one finalize step: reads see the step's own writes
/// first, then the committed store.
pub struct FinalizeContext<'a> {
    store: &'a dyn MappingStore,
    batch: &'a mut StateBatch,
}

impl<'a> FinalizeContext<'a> {
    pub fn new(store: &'a dyn MappingStore, batch: &'a mut StateBatch) -> Self {
        Self { store, batch }
    }

    fn read(&self, key: &Address) -> Result<Option<u64>, ProgramError> {
        match self.batch.mapping_value(key) {
            Some(v) => Ok(Some(v)),
            None => Ok(self.store.get(key)?),
        }
    }

    /// Read without a default: an absent key fails the step.
    pub fn get(&self, key: &Address) -> Result<u64, ProgramError> {
        self.read(key)?
            .ok_or_else(|| ProgramError::MissingKey(key.clone()))
    }

    /// Read with a default for absent keys.
    pub fn get_or_use(&self, key: &Address, default: u64) -> Result<u64, ProgramError> {
        Ok(self.read(key)?.unwrap_or(default))
    }

    pub fn set(&mut self, key: &Address, value: u64) {
        self.batch.put_mapping(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use veil_store::StoreError;

    /// Minimal mapping for exercising finalize without a full store.
    #[derive(Default)]
    struct MapStore(Mutex<BTreeMap<Address, u64>>);

    impl MappingStore for MapStore {
        fn get(&self, key: &Address) -> Result<Option<u64>, StoreError> {
            Ok(self.0.lock().unwrap().get(key).copied())
        }
        fn entries(&self) -> Result<Vec<(Address, u64)>, StoreError> {
            Ok(self.0.lock().unwrap().iter().map(|(k, v)| (k.clone(), *v)).collect())
        }
    }

    impl MapStore {
        fn seed(&self, key: &Address, value: u64) {
            self.0.lock().unwrap().insert(key.clone(), value);
        }
    }

    fn addr(b: u8) -> Address {
        Address::from_bytes(&[b; 32])
    }

    fn run(store: &MapStore, pending: &Pending) -> Result<StateBatch, ProgramError> {
        let mut batch = StateBatch::new();
        pending.apply(&mut FinalizeContext::new(store, &mut batch))?;
        Ok(batch)
    }

    #[test]
    fn credit_defaults_absent_receiver_to_zero() {
        let store = MapStore::default();
        let batch = run(
            &store,
            &Pending::TransferPrivateToPublic { receiver: addr(1), amount: 25 },
        )
        .unwrap();
        assert_eq!(batch.mapping_value(&addr(1)), Some(25));
        // Nothing reaches the store until the environment commits.
        assert_eq!(store.get(&addr(1)).unwrap(), None);
    }

    #[test]
    fn credit_adds_to_existing_balance() {
        let store = MapStore::default();
        store.seed(&addr(1), 100);
        let batch = run(&store, &Pending::MintPublic { receiver: addr(1), amount: 5 }).unwrap();
        assert_eq!(batch.mapping_value(&addr(1)), Some(105));
    }

    #[test]
    fn applying_the_same_credit_twice_double_credits() {
        let store = MapStore::default();
        store.seed(&addr(1), 10);
        let pending = Pending::TransferPrivateToPublic { receiver: addr(1), amount: 7 };
        let mut batch = StateBatch::new();
        let mut ctx = FinalizeContext::new(&store, &mut batch);
        pending.apply(&mut ctx).unwrap();
        pending.apply(&mut ctx).unwrap();
        assert_eq!(batch.mapping_value(&addr(1)), Some(24));
    }

    #[test]
    fn debit_of_absent_caller_is_an_assertion_failure() {
        let store = MapStore::default();
        let err = run(&store, &Pending::TransferPublicToPrivate { caller: addr(1), amount: 0 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
        assert!(matches!(err, ProgramError::MissingKey(_)));
    }

    #[test]
    fn debit_beyond_balance_is_an_arithmetic_failure() {
        let store = MapStore::default();
        store.seed(&addr(1), 10);
        let err = run(&store, &Pending::TransferPublicToPrivate { caller: addr(1), amount: 11 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticFailure);
    }

    #[test]
    fn credit_overflow_is_an_arithmetic_failure() {
        let store = MapStore::default();
        store.seed(&addr(1), u64::MAX);
        let err = run(&store, &Pending::MintPublic { receiver: addr(1), amount: 1 }).unwrap_err();
        assert!(matches!(err, ProgramError::Overflow { .. }));
    }

    #[test]
    fn public_transfer_moves_balance() {
        let store = MapStore::default();
        store.seed(&addr(1), 50);
        let batch = run(
            &store,
            &Pending::TransferPublic { caller: addr(1), receiver: addr(2), amount: 20 },
        )
        .unwrap();
        assert_eq!(batch.mapping_value(&addr(1)), Some(30));
        assert_eq!(batch.mapping_value(&addr(2)), Some(20));
    }

    #[test]
    fn public_transfer_to_self_keeps_balance() {
        let store = MapStore::default();
        store.seed(&addr(1), 50);
        let batch = run(
            &store,
            &Pending::TransferPublic { caller: addr(1), receiver: addr(1), amount: 20 },
        )
        .unwrap();
        assert_eq!(batch.mapping_value(&addr(1)), Some(50));
    }

    #[test]
    fn supply_delta_by_kind() {
        assert_eq!(Pending::MintPublic { receiver: addr(1), amount: 3 }.supply_delta(), 3);
        assert_eq!(
            Pending::TransferPublicToPrivate { caller: addr(1), amount: 3 }.supply_delta(),
            -3
        );
        assert_eq!(
            Pending::TransferPublic { caller: addr(1), receiver: addr(2), amount: 3 }
                .supply_delta(),
            0
        );
    }
}
