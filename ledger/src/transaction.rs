//! Transactions and the receipts returned once they are accepted.

use serde::{Deserialize, Serialize};
use veil_program::{Execution, Function, Pending, ProgramError, Token};
use veil_types::{Address, Field, TransitionId};

use crate::error::LedgerError;

/// An evaluated transition waiting to be committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransitionId,
    pub function: Function,
    pub caller: Address,
    pub consumed: Vec<Token>,
    pub outputs: Vec<Token>,
    pub pending: Option<Pending>,
    pub value: Option<Field>,
}

impl From<Execution> for Transaction {
    fn from(e: Execution) -> Self {
        Self {
            id: e.id,
            function: e.function,
            caller: e.caller,
            consumed: e.consumed,
            outputs: e.outputs,
            pending: e.pending,
            value: e.value,
        }
    }
}

/// Number of consumed and issued records each function produces.
fn shape(function: Function) -> (usize, usize) {
    match function {
        Function::Mint => (0, 1),
        Function::TransferPrivate => (1, 2),
        Function::TransferPrivateToPublic => (1, 1),
        Function::TransferPublicToPrivate => (0, 1),
        Function::Join => (2, 1),
        Function::MintPublic | Function::TransferPublic | Function::Main => (0, 0),
    }
}

impl Transaction {
    /// Check that the transaction is something `function` could have
    /// produced for `caller`.
    ///
    /// The ledger accepts transactions built outside [`Execution`], so it
    /// re-checks the record shape, input ownership, the finalize kind, who
    /// the finalize step debits, and value conservation for every function
    /// other than the two mints.
    pub fn check(&self) -> Result<(), LedgerError> {
        let (inputs, outputs) = shape(self.function);
        if self.consumed.len() != inputs || self.outputs.len() != outputs {
            return Err(self.invalid(format!(
                "{} takes {inputs} records and issues {outputs}",
                self.function
            )));
        }

        match &self.pending {
            Some(pending) if pending.function() != self.function => {
                return Err(self.invalid(format!(
                    "finalize step belongs to {}",
                    pending.function()
                )));
            }
            None if self.function.has_finalize() => {
                return Err(self.invalid("missing finalize step".into()));
            }
            _ => {}
        }

        if self.value.is_some() != (self.function == Function::Main) {
            return Err(self.invalid("unexpected return value".into()));
        }

        for record in &self.consumed {
            if record.owner != self.caller {
                return Err(ProgramError::NotOwner {
                    owner: record.owner.clone(),
                    caller: self.caller.clone(),
                }
                .into());
            }
        }

        if let Some(
            Pending::TransferPublicToPrivate { caller, .. } | Pending::TransferPublic { caller, .. },
        ) = &self.pending
        {
            if *caller != self.caller {
                return Err(self.invalid(format!("finalize debits {caller}")));
            }
        }

        if !matches!(self.function, Function::Mint | Function::MintPublic) {
            let consumed: i128 = self.consumed.iter().map(|t| t.balance as i128).sum();
            let issued: i128 = self.outputs.iter().map(|t| t.balance as i128).sum();
            let public = self.pending.as_ref().map_or(0, Pending::supply_delta);
            if consumed != issued + public {
                return Err(self.invalid(format!(
                    "consumes {consumed} but produces {}",
                    issued + public
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> LedgerError {
        LedgerError::InvalidTransaction { id: self.id, reason }
    }
}

/// What an accepted transaction produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: TransitionId,
    pub function: Function,
    /// Records now held by their owners.
    pub outputs: Vec<Token>,
    /// Return value of `main`.
    pub value: Option<Field>,
    /// Ledger height after this transaction.
    pub height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_program::{transition, Call, ErrorKind, ExecutionContext};

    fn addr(b: u8) -> Address {
        Address::from_bytes(&[b; 32])
    }

    fn ctx(caller: u8) -> ExecutionContext {
        ExecutionContext::new(addr(caller), [caller; 32])
    }

    fn minted(caller: u8, amount: u64) -> Token {
        transition::mint(&ctx(caller), amount).unwrap().outputs.remove(0)
    }

    fn tx(caller: u8, call: Call) -> Transaction {
        call.evaluate(&ctx(caller)).unwrap().into()
    }

    #[test]
    fn evaluated_calls_pass() {
        let (alice, bob) = (addr(1), addr(2));
        let calls = [
            Call::Mint { amount: 9 },
            Call::TransferPrivate { receiver: bob.clone(), amount: 3, input: minted(1, 10) },
            Call::TransferPrivateToPublic { receiver: bob.clone(), amount: 3, input: minted(1, 10) },
            Call::TransferPublicToPrivate { receiver: bob.clone(), amount: 3 },
            Call::Join { input: minted(1, 10), input2: minted(1, 20) },
            Call::MintPublic { receiver: alice, amount: 3 },
            Call::TransferPublic { receiver: bob, amount: 3 },
            Call::Main { a: Field::from_u64(13), b: Field::ONE },
        ];
        for call in calls {
            let function = call.function();
            assert!(tx(1, call).check().is_ok(), "{function} rejected");
        }
    }

    #[test]
    fn inflated_output_is_rejected() {
        let mut forged = tx(1, Call::TransferPrivate {
            receiver: addr(2),
            amount: 3,
            input: minted(1, 10),
        });
        forged.outputs[1].balance = 1_000;
        let err = forged.check().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransaction { .. }));
    }

    #[test]
    fn foreign_input_is_not_owned() {
        let mut forged = tx(1, Call::TransferPrivate {
            receiver: addr(1),
            amount: 3,
            input: minted(1, 10),
        });
        forged.caller = addr(9);
        let err = forged.check().unwrap_err();
        assert_eq!(err.program_kind(), Some(ErrorKind::AssertionFailure));
    }

    #[test]
    fn finalize_must_match_function() {
        let mut forged = tx(1, Call::Mint { amount: 5 });
        forged.pending = Some(Pending::MintPublic { receiver: addr(1), amount: 5 });
        assert!(forged.check().is_err());

        let mut stripped = tx(1, Call::TransferPublic { receiver: addr(2), amount: 5 });
        stripped.pending = None;
        assert!(stripped.check().is_err());
    }

    #[test]
    fn finalize_may_only_debit_the_caller() {
        let mut forged = tx(1, Call::TransferPublic { receiver: addr(1), amount: 5 });
        forged.pending = Some(Pending::TransferPublic {
            caller: addr(2),
            receiver: addr(1),
            amount: 5,
        });
        let err = forged.check().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransaction { .. }));
    }
}
