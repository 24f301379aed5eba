//! Program errors.

use thiserror::Error;
use veil_types::Address;

/// The two failure classes a transition or finalize step can end in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Balance underflow or overflow.
    ArithmeticFailure,
    /// A failed `assert`, an absent mapping key read without a default, or
    /// a record spent by someone other than its owner.
    AssertionFailure,
    /// Anything outside the program's own semantics (storage, entropy, encoding).
    Environment,
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("arithmetic underflow: {minuend} - {subtrahend}")]
    Underflow { minuend: u64, subtrahend: u64 },

    #[error("arithmetic overflow: {lhs} + {rhs}")]
    Overflow { lhs: u64, rhs: u64 },

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("mapping key {0} is absent")]
    MissingKey(Address),

    #[error("record owned by {owner} cannot be spent by {caller}")]
    NotOwner { owner: Address, caller: Address },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("storage error: {0}")]
    Store(#[from] veil_store::StoreError),
}

impl ProgramError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Underflow { .. } | Self::Overflow { .. } => ErrorKind::ArithmeticFailure,
            Self::AssertionFailed(_) | Self::MissingKey(_) | Self::NotOwner { .. } => {
                ErrorKind::AssertionFailure
            }
            Self::UnknownFunction(_)
            | Self::MalformedRecord(_)
            | Self::Entropy(_)
            | Self::Store(_) => ErrorKind::Environment,
        }
    }
}

/// `a - b` over u64, rejecting underflow.
pub(crate) fn checked_sub(minuend: u64, subtrahend: u64) -> Result<u64, ProgramError> {
    minuend
        .checked_sub(subtrahend)
        .ok_or(ProgramError::Underflow { minuend, subtrahend })
}

/// `a + b` over u64, rejecting overflow.
pub(crate) fn checked_add(lhs: u64, rhs: u64) -> Result<u64, ProgramError> {
    lhs.checked_add(rhs).ok_or(ProgramError::Overflow { lhs, rhs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_helpers_reject_wrapping() {
        assert_eq!(checked_sub(10, 3).unwrap(), 7);
        assert_eq!(checked_sub(3, 10).unwrap_err().kind(), ErrorKind::ArithmeticFailure);
        assert_eq!(checked_add(u64::MAX - 1, 1).unwrap(), u64::MAX);
        assert_eq!(checked_add(u64::MAX, 1).unwrap_err().kind(), ErrorKind::ArithmeticFailure);
    }

    #[test]
    fn missing_key_is_an_assertion_failure() {
        let err = ProgramError::MissingKey(Address::from_bytes(&[1; 32]));
        assert_eq!(err.kind(), ErrorKind::AssertionFailure);
    }
}
