//! Program functions and their argument sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use veil_types::{Address, Field};

use crate::context::ExecutionContext;
use crate::error::ProgramError;
use crate::token::Token;
use crate::transition::{self, Execution};

/// Every function the token program exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Mint,
    TransferPrivate,
    TransferPrivateToPublic,
    TransferPublicToPrivate,
    Join,
    MintPublic,
    TransferPublic,
    Main,
}

impl Function {
    pub const ALL: [Function; 8] = [
        Function::Mint,
        Function::TransferPrivate,
        Function::TransferPrivateToPublic,
        Function::TransferPublicToPrivate,
        Function::Join,
        Function::MintPublic,
        Function::TransferPublic,
        Function::Main,
    ];

    /// The function's name as it appears in the program.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::TransferPrivate => "transfer_private",
            Self::TransferPrivateToPublic => "transfer_private_to_public",
            Self::TransferPublicToPrivate => "transfer_public_to_private",
            Self::Join => "join",
            Self::MintPublic => "mint_public",
            Self::TransferPublic => "transfer_public",
            Self::Main => "main",
        }
    }

    /// Whether the function schedules a finalize step.
    pub fn has_finalize(&self) -> bool {
        matches!(
            self,
            Self::TransferPrivateToPublic
                | Self::TransferPublicToPrivate
                | Self::MintPublic
                | Self::TransferPublic
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ProgramError::UnknownFunction(s.to_string()))
    }
}

/// A function together with its arguments, ready to evaluate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Mint {
        amount: u64,
    },
    TransferPrivate {
        receiver: Address,
        amount: u64,
        input: Token,
    },
    TransferPrivateToPublic {
        receiver: Address,
        amount: u64,
        input: Token,
    },
    TransferPublicToPrivate {
        receiver: Address,
        amount: u64,
    },
    Join {
        input: Token,
        input2: Token,
    },
    MintPublic {
        receiver: Address,
        amount: u64,
    },
    TransferPublic {
        receiver: Address,
        amount: u64,
    },
    Main {
        a: Field,
        b: Field,
    },
}

impl Call {
    pub fn function(&self) -> Function {
        match self {
            Self::Mint { .. } => Function::Mint,
            Self::TransferPrivate { .. } => Function::TransferPrivate,
            Self::TransferPrivateToPublic { .. } => Function::TransferPrivateToPublic,
            Self::TransferPublicToPrivate { .. } => Function::TransferPublicToPrivate,
            Self::Join { .. } => Function::Join,
            Self::MintPublic { .. } => Function::MintPublic,
            Self::TransferPublic { .. } => Function::TransferPublic,
            Self::Main { .. } => Function::Main,
        }
    }

    /// Run the transition half of the call.
    pub fn evaluate(self, ctx: &ExecutionContext) -> Result<Execution, ProgramError> {
        match self {
            Self::Mint { amount } => transition::mint(ctx, amount),
            Self::TransferPrivate {
                receiver,
                amount,
                input,
            } => transition::transfer_private(ctx, &receiver, amount, input),
            Self::TransferPrivateToPublic {
                receiver,
                amount,
                input,
            } => transition::transfer_private_to_public(ctx, &receiver, amount, input),
            Self::TransferPublicToPrivate { receiver, amount } => {
                transition::transfer_public_to_private(ctx, &receiver, amount)
            }
            Self::Join { input, input2 } => transition::join(ctx, input, input2),
            Self::MintPublic { receiver, amount } => {
                transition::mint_public(ctx, &receiver, amount)
            }
            Self::TransferPublic { receiver, amount } => {
                transition::transfer_public(ctx, &receiver, amount)
            }
            Self::Main { a, b } => transition::gate(ctx, a, b),
        }
    }
}
