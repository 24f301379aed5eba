use thiserror::Error;
use veil_program::{ErrorKind, ProgramError};
use veil_types::{Commitment, TransitionId};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("program error: {0}")]
    Program(#[from] ProgramError),

    #[error("record {0} has already been spent")]
    RecordAlreadySpent(Commitment),

    #[error("record {0} is not known to the ledger")]
    UnknownRecord(Commitment),

    #[error("record {0} is used more than once in the same transaction")]
    DuplicateInput(Commitment),

    #[error("transaction {id} is malformed: {reason}")]
    InvalidTransaction { id: TransitionId, reason: String },

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("storage error: {0}")]
    Storage(#[from] veil_store::StoreError),
}

impl LedgerError {
    /// The program failure class, when the rejection came from the program.
    pub fn program_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Program(e) => Some(e.kind()),
            _ => None,
        }
    }
}
