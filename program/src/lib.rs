//! The token program.
//!
//! A token lives in two places:
//! - **private**: as single-use [`Token`] records held by their owner, and
//! - **public**: as the per-address `balance` mapping, mutated only by
//!   finalize steps.
//!
//! Transitions are pure functions of their inputs and the caller's
//! [`ExecutionContext`]. Functions that touch public state return a
//! [`Pending`] finalize request alongside their outputs; applying it is the
//! job of the execution environment (see the `veil-ledger` crate).

pub mod call;
pub mod context;
pub mod error;
pub mod finalize;
pub mod gate;
pub mod token;
pub mod transition;

pub use call::{Call, Function};
pub use context::{ExecutionContext, OsSeed, SeedSource};
pub use error::{ErrorKind, ProgramError};
pub use finalize::{FinalizeContext, Pending};
pub use token::Token;
pub use transition::Execution;
