//! The execution environment.
//!
//! [`Ledger`] is the collaborator the token program assumes: it supplies the
//! caller identity and seed, checks that consumed records exist and are
//! unspent, runs finalize against the public mapping and commits the whole
//! unit through one [`StateBatch`].

use std::collections::HashSet;
use std::sync::Mutex;

use rayon::prelude::*;
use veil_program::{Call, ExecutionContext, FinalizeContext, OsSeed, SeedSource, Token};
use veil_store::{LedgerStore, StateBatch, StoredRecord};
use veil_types::{Address, Commitment};
use veil_utils::spans;

use crate::error::LedgerError;
use crate::snapshot::{AccountEntry, LedgerSnapshot};
use crate::transaction::{Receipt, Transaction};

pub struct Ledger<S: LedgerStore> {
    store: S,
    seeds: Box<dyn SeedSource>,
    /// Serialises commits so finalize reads and writes never interleave.
    commit_lock: Mutex<()>,
}

impl<S: LedgerStore> Ledger<S> {
    /// A ledger drawing transition seeds from the OS.
    pub fn new(store: S) -> Self {
        Self::with_seed_source(store, Box::new(OsSeed))
    }

    pub fn with_seed_source(store: S, seeds: Box<dyn SeedSource>) -> Self {
        Self {
            store,
            seeds,
            commit_lock: Mutex::new(()),
        }
    }

    /// Rebuild a ledger from a verified snapshot into an empty `store`.
    pub fn from_snapshot(
        snapshot: &LedgerSnapshot,
        store: S,
        seeds: Box<dyn SeedSource>,
    ) -> Result<Self, LedgerError> {
        if !snapshot.verify() {
            return Err(LedgerError::Snapshot("hash mismatch".into()));
        }
        let mut batch = StateBatch::new();
        for entry in &snapshot.accounts {
            batch.put_mapping(&entry.address, entry.balance);
        }
        for record in &snapshot.records {
            batch.put_record(stored(record));
        }
        for serial in &snapshot.spent {
            batch.spend(*serial);
        }
        store.restore(batch, snapshot.height)?;
        tracing::info!(
            height = snapshot.height,
            accounts = snapshot.accounts.len(),
            records = snapshot.records.len(),
            "ledger restored from snapshot"
        );
        Ok(Self::with_seed_source(store, seeds))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate `call` as `caller` with a fresh seed and commit it.
    pub fn execute(&self, caller: &Address, call: Call) -> Result<Receipt, LedgerError> {
        let ctx = ExecutionContext::with_source(caller.clone(), self.seeds.as_ref())?;
        self.execute_with(&ctx, call)
    }

    /// Evaluate `call` under an explicit context and commit it.
    pub fn execute_with(
        &self,
        ctx: &ExecutionContext,
        call: Call,
    ) -> Result<Receipt, LedgerError> {
        let function = call.function();
        let _span = spans::execute_span(function.name()).entered();
        let execution = call.evaluate(ctx).map_err(|e| {
            tracing::warn!(%function, caller = %ctx.caller, error = %e, "transition rejected");
            e
        })?;
        self.apply(execution.into())
    }

    /// Evaluate many calls in parallel, then commit them one by one in
    /// submission order. Each result is independent of the others.
    pub fn execute_batch(
        &self,
        calls: Vec<(Address, Call)>,
    ) -> Vec<Result<Receipt, LedgerError>> {
        let _span = spans::batch_span(calls.len()).entered();

        // Seeds are drawn up front so a deterministic source stays deterministic.
        let prepared: Vec<Result<(ExecutionContext, Call), LedgerError>> = calls
            .into_iter()
            .map(|(caller, call)| -> Result<_, LedgerError> {
                let ctx = ExecutionContext::with_source(caller, self.seeds.as_ref())?;
                Ok((ctx, call))
            })
            .collect();

        let evaluated: Vec<Result<Transaction, LedgerError>> = prepared
            .into_par_iter()
            .map(|prepared| -> Result<Transaction, LedgerError> {
                let (ctx, call) = prepared?;
                Ok(call.evaluate(&ctx)?.into())
            })
            .collect();

        evaluated
            .into_iter()
            .map(|tx| self.apply(tx?))
            .collect()
    }

    /// Commit an evaluated transaction: check its shape, validate its
    /// inputs, run its finalize step and write everything in one batch.
    pub fn apply(&self, tx: Transaction) -> Result<Receipt, LedgerError> {
        let tx_id = tx.id.to_string();
        let _span = spans::apply_span(&tx_id, tx.function.name()).entered();
        let _guard = self.commit_lock.lock().unwrap();

        match self.stage(&tx) {
            Ok(batch) => {
                let writes = batch.mapping_writes.len();
                self.store.commit(batch)?;
                let height = self.store.height()?;
                tracing::info!(
                    function = %tx.function,
                    caller = %tx.caller,
                    outputs = tx.outputs.len(),
                    spent = tx.consumed.len(),
                    mapping_writes = writes,
                    height,
                    "transaction accepted"
                );
                Ok(Receipt {
                    id: tx.id,
                    function: tx.function,
                    outputs: tx.outputs,
                    value: tx.value,
                    height,
                })
            }
            Err(e) => {
                tracing::warn!(
                    function = %tx.function,
                    caller = %tx.caller,
                    error = %e,
                    "transaction rejected"
                );
                Err(e)
            }
        }
    }

    /// Build the write batch for `tx` without touching the store.
    fn stage(&self, tx: &Transaction) -> Result<StateBatch, LedgerError> {
        tx.check()?;
        let mut batch = StateBatch::new();

        let mut seen = HashSet::new();
        for record in &tx.consumed {
            let commitment = record.commitment();
            if !seen.insert(commitment) {
                return Err(LedgerError::DuplicateInput(commitment));
            }
            if !self.store.record_exists(&commitment)? {
                return Err(LedgerError::UnknownRecord(commitment));
            }
            let serial = commitment.serial_number();
            if self.store.is_spent(&serial)? {
                return Err(LedgerError::RecordAlreadySpent(commitment));
            }
            batch.spend(serial);
        }

        if let Some(pending) = &tx.pending {
            let _span = spans::finalize_span(&tx.id.to_string()).entered();
            let mut ctx = FinalizeContext::new(&self.store, &mut batch);
            pending.apply(&mut ctx)?;
            tracing::debug!(
                kind = %pending.function(),
                writes = ?batch.mapping_writes,
                "finalize applied"
            );
        }

        for output in &tx.outputs {
            batch.put_record(stored(output));
        }
        Ok(batch)
    }

    /// Public balance of `address`; absent entries read as 0.
    pub fn public_balance(&self, address: &Address) -> Result<u64, LedgerError> {
        Ok(self.store.get_or_use(address, 0)?)
    }

    /// Unspent records owned by `owner`, in issue order.
    pub fn records_of(&self, owner: &Address) -> Result<Vec<Token>, LedgerError> {
        let mut out = Vec::new();
        for commitment in self.store.records_of(owner)? {
            let token = self.load(&commitment)?;
            if !self.store.is_spent(&token.serial_number())? {
                out.push(token);
            }
        }
        Ok(out)
    }

    /// Look up a live record by commitment.
    pub fn unspent_record(&self, commitment: &Commitment) -> Result<Token, LedgerError> {
        if !self.store.record_exists(commitment)? {
            return Err(LedgerError::UnknownRecord(*commitment));
        }
        if self.store.is_spent(&commitment.serial_number())? {
            return Err(LedgerError::RecordAlreadySpent(*commitment));
        }
        self.load(commitment)
    }

    pub fn is_spent(&self, record: &Token) -> Result<bool, LedgerError> {
        Ok(self.store.is_spent(&record.serial_number())?)
    }

    /// Number of accepted transactions.
    pub fn height(&self) -> Result<u64, LedgerError> {
        Ok(self.store.height()?)
    }

    /// Sum of every live record balance and every public balance.
    pub fn total_supply(&self) -> Result<u128, LedgerError> {
        let public: u128 = self
            .store
            .entries()?
            .into_iter()
            .map(|(_, v)| v as u128)
            .sum();
        let mut private = 0u128;
        for stored in self.store.iter_records()? {
            let token = Token::from_bytes(&stored.bytes)?;
            if !self.store.is_spent(&token.serial_number())? {
                private += token.balance as u128;
            }
        }
        Ok(public + private)
    }

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let _guard = self.commit_lock.lock().unwrap();
        let accounts = self
            .store
            .entries()?
            .into_iter()
            .map(|(address, balance)| AccountEntry { address, balance })
            .collect();
        let records = self
            .store
            .iter_records()?
            .iter()
            .map(|r| Token::from_bytes(&r.bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let spent = self.store.spent_serials()?;
        Ok(LedgerSnapshot::create(
            accounts,
            records,
            spent,
            self.store.height()?,
        ))
    }

    fn load(&self, commitment: &Commitment) -> Result<Token, LedgerError> {
        let stored = self.store.get_record(commitment)?;
        Ok(Token::from_bytes(&stored.bytes)?)
    }
}

fn stored(token: &Token) -> StoredRecord {
    StoredRecord {
        commitment: token.commitment(),
        owner: token.owner.clone(),
        bytes: token.to_bytes(),
    }
}
