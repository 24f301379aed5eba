//! Transition functions.
//!
//! Each transition is evaluated locally against its inputs and the caller's
//! context. Nothing here touches shared state: consumed records are only
//! *named* in the returned [`Execution`], and public-balance effects are
//! described by its [`Pending`] finalize request.

use serde::{Deserialize, Serialize};
use veil_types::{Address, Field, TransitionId};

use crate::call::Function;
use crate::context::{output_nonce, ExecutionContext, Transcript};
use crate::error::{checked_add, checked_sub, ProgramError};
use crate::finalize::Pending;
use crate::token::Token;

/// The result of evaluating one transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: TransitionId,
    pub function: Function,
    pub caller: Address,
    /// Records spent by this transition, in input order.
    pub consumed: Vec<Token>,
    /// Records issued by this transition, in output order.
    pub outputs: Vec<Token>,
    /// Deferred finalize step, if the function has one.
    pub pending: Option<Pending>,
    /// Plain return value (only `main`).
    pub value: Option<Field>,
}

impl Execution {
    /// Sum of the balances of the issued records.
    pub fn output_total(&self) -> u128 {
        self.outputs.iter().map(|t| t.balance as u128).sum()
    }

    /// Sum of the balances of the consumed records.
    pub fn consumed_total(&self) -> u128 {
        self.consumed.iter().map(|t| t.balance as u128).sum()
    }
}

/// Builder shared by the transition functions: fixes the transition id up
/// front, then derives one nonce per output slot.
struct Builder {
    id: TransitionId,
    function: Function,
    caller: Address,
    consumed: Vec<Token>,
    outputs: Vec<Token>,
}

impl Builder {
    fn new(function: Function, ctx: &ExecutionContext, transcript: &Transcript) -> Self {
        Self {
            id: transcript.finish(),
            function,
            caller: ctx.caller.clone(),
            consumed: Vec::new(),
            outputs: Vec::new(),
        }
    }

    fn consume(mut self, input: Token) -> Self {
        self.consumed.push(input);
        self
    }

    fn output(mut self, owner: Address, balance: u64) -> Self {
        let nonce = output_nonce(&self.id, self.outputs.len() as u16);
        self.outputs.push(Token {
            owner,
            balance,
            nonce,
        });
        self
    }

    fn finish(self, pending: Option<Pending>) -> Execution {
        Execution {
            id: self.id,
            function: self.function,
            caller: self.caller,
            consumed: self.consumed,
            outputs: self.outputs,
            pending,
            value: None,
        }
    }
}

/// A consumed record must belong to the caller.
fn assert_owned(ctx: &ExecutionContext, input: &Token) -> Result<(), ProgramError> {
    if input.owner != ctx.caller {
        return Err(ProgramError::NotOwner {
            owner: input.owner.clone(),
            caller: ctx.caller.clone(),
        });
    }
    Ok(())
}

fn transcript(function: Function, ctx: &ExecutionContext) -> Transcript {
    Transcript::new(function.name(), ctx)
}

/// Issue a new record owned by the caller.
pub fn mint(ctx: &ExecutionContext, amount: u64) -> Result<Execution, ProgramError> {
    let mut t = transcript(Function::Mint, ctx);
    t.absorb(&amount.to_le_bytes());
    Ok(Builder::new(Function::Mint, ctx, &t)
        .output(ctx.caller.clone(), amount)
        .finish(None))
}

/// Split `input` into caller change (output 0) and a receiver record (output 1).
pub fn transfer_private(
    ctx: &ExecutionContext,
    receiver: &Address,
    amount: u64,
    input: Token,
) -> Result<Execution, ProgramError> {
    assert_owned(ctx, &input)?;
    let remaining = checked_sub(input.balance, amount)?;

    let mut t = transcript(Function::TransferPrivate, ctx);
    t.absorb(&receiver.to_bytes())
        .absorb(&amount.to_le_bytes())
        .absorb(input.commitment().as_bytes());
    Ok(Builder::new(Function::TransferPrivate, ctx, &t)
        .consume(input)
        .output(ctx.caller.clone(), remaining)
        .output(receiver.clone(), amount)
        .finish(None))
}

/// Keep the change privately and credit `receiver`'s public balance in finalize.
pub fn transfer_private_to_public(
    ctx: &ExecutionContext,
    receiver: &Address,
    amount: u64,
    input: Token,
) -> Result<Execution, ProgramError> {
    assert_owned(ctx, &input)?;
    let remaining = checked_sub(input.balance, amount)?;

    let mut t = transcript(Function::TransferPrivateToPublic, ctx);
    t.absorb(&receiver.to_bytes())
        .absorb(&amount.to_le_bytes())
        .absorb(input.commitment().as_bytes());
    Ok(Builder::new(Function::TransferPrivateToPublic, ctx, &t)
        .consume(input)
        .output(ctx.caller.clone(), remaining)
        .finish(Some(Pending::TransferPrivateToPublic {
            receiver: receiver.clone(),
            amount,
        })))
}

/// Issue `receiver` a record now; debit the caller's public balance in finalize.
///
/// No balance check happens here. If the finalize debit fails the whole
/// execution is discarded, record included.
pub fn transfer_public_to_private(
    ctx: &ExecutionContext,
    receiver: &Address,
    amount: u64,
) -> Result<Execution, ProgramError> {
    let mut t = transcript(Function::TransferPublicToPrivate, ctx);
    t.absorb(&receiver.to_bytes()).absorb(&amount.to_le_bytes());
    Ok(Builder::new(Function::TransferPublicToPrivate, ctx, &t)
        .output(receiver.clone(), amount)
        .finish(Some(Pending::TransferPublicToPrivate {
            caller: ctx.caller.clone(),
            amount,
        })))
}

/// Merge two caller-owned records into one.
pub fn join(ctx: &ExecutionContext, input: Token, input2: Token) -> Result<Execution, ProgramError> {
    assert_owned(ctx, &input)?;
    assert_owned(ctx, &input2)?;
    let total = checked_add(input.balance, input2.balance)?;

    let mut t = transcript(Function::Join, ctx);
    t.absorb(input.commitment().as_bytes())
        .absorb(input2.commitment().as_bytes());
    Ok(Builder::new(Function::Join, ctx, &t)
        .consume(input)
        .consume(input2)
        .output(ctx.caller.clone(), total)
        .finish(None))
}

/// Credit `receiver`'s public balance with new supply.
pub fn mint_public(
    ctx: &ExecutionContext,
    receiver: &Address,
    amount: u64,
) -> Result<Execution, ProgramError> {
    let mut t = transcript(Function::MintPublic, ctx);
    t.absorb(&receiver.to_bytes()).absorb(&amount.to_le_bytes());
    Ok(Builder::new(Function::MintPublic, ctx, &t).finish(Some(Pending::MintPublic {
        receiver: receiver.clone(),
        amount,
    })))
}

/// Move public balance from the caller to `receiver`.
pub fn transfer_public(
    ctx: &ExecutionContext,
    receiver: &Address,
    amount: u64,
) -> Result<Execution, ProgramError> {
    let mut t = transcript(Function::TransferPublic, ctx);
    t.absorb(&receiver.to_bytes()).absorb(&amount.to_le_bytes());
    Ok(
        Builder::new(Function::TransferPublic, ctx, &t).finish(Some(Pending::TransferPublic {
            caller: ctx.caller.clone(),
            receiver: receiver.clone(),
            amount,
        })),
    )
}

/// Evaluate the field gate as a transition (no records, no finalize).
pub fn gate(ctx: &ExecutionContext, a: Field, b: Field) -> Result<Execution, ProgramError> {
    let value = crate::gate::main(a, b)?;
    let mut t = transcript(Function::Main, ctx);
    t.absorb(a.to_string().as_bytes())
        .absorb(b.to_string().as_bytes());
    let mut execution = Builder::new(Function::Main, ctx, &t).finish(None);
    execution.value = Some(value);
    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn addr(b: u8) -> Address {
        Address::from_bytes(&[b; 32])
    }

    fn ctx(caller: u8) -> ExecutionContext {
        ExecutionContext::new(addr(caller), [caller; 32])
    }

    fn minted(caller: u8, amount: u64) -> Token {
        mint(&ctx(caller), amount).unwrap().outputs.remove(0)
    }

    #[test]
    fn mint_issues_caller_owned_record() {
        let exec = mint(&ctx(1), 100).unwrap();
        assert_eq!(exec.outputs.len(), 1);
        assert_eq!(exec.outputs[0].owner, addr(1));
        assert_eq!(exec.outputs[0].balance, 100);
        assert!(exec.consumed.is_empty());
        assert!(exec.pending.is_none());
    }

    #[test]
    fn transfer_private_splits_balance() {
        let t1 = minted(1, 100);
        let exec = transfer_private(&ctx(1), &addr(2), 30, t1.clone()).unwrap();
        assert_eq!(exec.consumed, vec![t1]);
        assert_eq!(exec.outputs[0].owner, addr(1));
        assert_eq!(exec.outputs[0].balance, 70);
        assert_eq!(exec.outputs[1].owner, addr(2));
        assert_eq!(exec.outputs[1].balance, 30);
    }

    #[test]
    fn transfer_private_of_entire_balance_leaves_zero_change() {
        let exec = transfer_private(&ctx(1), &addr(2), 100, minted(1, 100)).unwrap();
        assert_eq!(exec.outputs[0].balance, 0);
        assert_eq!(exec.outputs[1].balance, 100);
    }

    #[test]
    fn transfer_private_underflow() {
        let err = transfer_private(&ctx(1), &addr(2), 101, minted(1, 100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticFailure);
    }

    #[test]
    fn spending_someone_elses_record_is_rejected() {
        let err = transfer_private(&ctx(2), &addr(3), 1, minted(1, 100)).unwrap_err();
        assert!(matches!(err, ProgramError::NotOwner { .. }));
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
    }

    #[test]
    fn private_to_public_keeps_change_and_defers_credit() {
        let exec = transfer_private_to_public(&ctx(1), &addr(2), 40, minted(1, 100)).unwrap();
        assert_eq!(exec.outputs.len(), 1);
        assert_eq!(exec.outputs[0].balance, 60);
        assert_eq!(
            exec.pending,
            Some(Pending::TransferPrivateToPublic { receiver: addr(2), amount: 40 })
        );
    }

    #[test]
    fn public_to_private_issues_record_optimistically() {
        let exec = transfer_public_to_private(&ctx(1), &addr(2), 500).unwrap();
        assert_eq!(exec.outputs[0].owner, addr(2));
        assert_eq!(exec.outputs[0].balance, 500);
        assert_eq!(
            exec.pending,
            Some(Pending::TransferPublicToPrivate { caller: addr(1), amount: 500 })
        );
    }

    #[test]
    fn join_sums_balances() {
        let a = minted(1, 70);
        let b = mint(&ExecutionContext::new(addr(1), [9; 32]), 30).unwrap().outputs.remove(0);
        let exec = join(&ctx(1), a, b).unwrap();
        assert_eq!(exec.outputs[0].balance, 100);
        assert_eq!(exec.outputs[0].owner, addr(1));
        assert_eq!(exec.consumed.len(), 2);
    }

    #[test]
    fn join_overflow() {
        let a = minted(1, u64::MAX);
        let b = mint(&ExecutionContext::new(addr(1), [9; 32]), 1).unwrap().outputs.remove(0);
        let err = join(&ctx(1), a, b).unwrap_err();
        assert!(matches!(err, ProgramError::Overflow { .. }));
    }

    #[test]
    fn join_after_transfer_fails_on_ownership() {
        let exec = transfer_private(&ctx(1), &addr(2), 30, minted(1, 100)).unwrap();
        let mut outs = exec.outputs.into_iter();
        let (change, sent) = (outs.next().unwrap(), outs.next().unwrap());
        let err = join(&ctx(1), change, sent).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
    }

    #[test]
    fn outputs_of_one_transition_have_distinct_commitments() {
        // Same owner and balance in both slots still gives distinct records.
        let exec = transfer_private(&ctx(1), &addr(1), 50, minted(1, 100)).unwrap();
        assert_ne!(exec.outputs[0].commitment(), exec.outputs[1].commitment());
    }

    #[test]
    fn seed_changes_transition_id() {
        let a = mint(&ExecutionContext::new(addr(1), [1; 32]), 5).unwrap();
        let b = mint(&ExecutionContext::new(addr(1), [2; 32]), 5).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.outputs[0].nonce, b.outputs[0].nonce);
    }

    #[test]
    fn public_functions_issue_no_records() {
        let exec = mint_public(&ctx(1), &addr(2), 10).unwrap();
        assert!(exec.outputs.is_empty());
        assert_eq!(exec.pending.unwrap().supply_delta(), 10);

        let exec = transfer_public(&ctx(1), &addr(2), 10).unwrap();
        assert!(exec.outputs.is_empty());
        assert_eq!(
            exec.pending,
            Some(Pending::TransferPublic { caller: addr(1), receiver: addr(2), amount: 10 })
        );
    }

    #[test]
    fn gate_returns_value() {
        let exec = gate(&ctx(1), Field::from_u64(10), Field::from_u64(5)).unwrap();
        assert_eq!(exec.value, Some(Field::from_u64(15)));
        assert!(gate(&ctx(1), Field::from_u64(11), Field::from_u64(5)).is_err());
    }
}
