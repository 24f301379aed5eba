//! Subcommands and their execution against a loaded ledger.

use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};
use veil_ledger::{Ledger, Receipt};
use veil_nullables::NullStore;
use veil_program::{Call, Token};
use veil_types::{Address, Commitment, Field};

use crate::CliError;

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Mint a private record owned by the caller.
    Mint { amount: u64 },

    /// Send part of a record to RECEIVER, keeping the change.
    TransferPrivate {
        receiver: Address,
        amount: u64,
        /// Commitment (hex) of the record to spend.
        record: Commitment,
    },

    /// Spend part of a record into RECEIVER's public balance.
    TransferPrivateToPublic {
        receiver: Address,
        amount: u64,
        record: Commitment,
    },

    /// Move public balance from the caller into a record for RECEIVER.
    TransferPublicToPrivate { receiver: Address, amount: u64 },

    /// Merge two of the caller's records.
    Join { record: Commitment, record2: Commitment },

    /// Credit RECEIVER's public balance with new supply.
    MintPublic { receiver: Address, amount: u64 },

    /// Move public balance from the caller to RECEIVER.
    TransferPublic { receiver: Address, amount: u64 },

    /// Evaluate the field gate: requires A to be 10 or 13, prints A + B.
    Main { a: Field, b: Field },

    /// Show a public balance (defaults to the caller).
    Balance { address: Option<Address> },

    /// List unspent records (defaults to the caller's).
    Records { owner: Option<Address> },

    /// Show the state file's height and hash.
    Snapshot,
}

impl Command {
    /// Whether the command only reads state.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Balance { .. } | Self::Records { .. } | Self::Snapshot)
    }
}

/// A record as printed on the command line.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub commitment: String,
    pub owner: Address,
    pub balance: u64,
}

impl From<&Token> for RecordView {
    fn from(token: &Token) -> Self {
        Self {
            commitment: token.commitment().to_string(),
            owner: token.owner.clone(),
            balance: token.balance,
        }
    }
}

fn receipt_json(receipt: &Receipt) -> Value {
    let records: Vec<RecordView> = receipt.outputs.iter().map(RecordView::from).collect();
    json!({
        "transition": receipt.id.to_string(),
        "function": receipt.function.name(),
        "height": receipt.height,
        "records": records,
        "value": receipt.value.map(|v| v.to_string()),
    })
}

fn require(caller: Option<&Address>) -> Result<&Address, CliError> {
    caller.ok_or(CliError::MissingCaller)
}

/// Run `command` and describe the result as JSON.
pub fn run(
    ledger: &Ledger<NullStore>,
    caller: Option<&Address>,
    command: Command,
) -> Result<Value, CliError> {
    let call = match command {
        Command::Balance { address } => {
            let address = match address {
                Some(a) => a,
                None => require(caller)?.clone(),
            };
            let balance = ledger.public_balance(&address)?;
            return Ok(json!({ "address": address, "balance": balance }));
        }
        Command::Records { owner } => {
            let owner = match owner {
                Some(o) => o,
                None => require(caller)?.clone(),
            };
            let records: Vec<RecordView> =
                ledger.records_of(&owner)?.iter().map(RecordView::from).collect();
            return Ok(json!({ "owner": owner, "records": records }));
        }
        Command::Snapshot => {
            let snap = ledger.snapshot()?;
            return Ok(json!({
                "height": snap.height,
                "hash": snap.hash_hex(),
                "accounts": snap.accounts.len(),
                "records": snap.records.len(),
                "spent": snap.spent.len(),
            }));
        }
        Command::Mint { amount } => Call::Mint { amount },
        Command::TransferPrivate {
            receiver,
            amount,
            record,
        } => Call::TransferPrivate {
            receiver,
            amount,
            input: ledger.unspent_record(&record)?,
        },
        Command::TransferPrivateToPublic {
            receiver,
            amount,
            record,
        } => Call::TransferPrivateToPublic {
            receiver,
            amount,
            input: ledger.unspent_record(&record)?,
        },
        Command::TransferPublicToPrivate { receiver, amount } => {
            Call::TransferPublicToPrivate { receiver, amount }
        }
        Command::Join { record, record2 } => Call::Join {
            input: ledger.unspent_record(&record)?,
            input2: ledger.unspent_record(&record2)?,
        },
        Command::MintPublic { receiver, amount } => Call::MintPublic { receiver, amount },
        Command::TransferPublic { receiver, amount } => Call::TransferPublic { receiver, amount },
        Command::Main { a, b } => Call::Main { a, b },
    };

    let receipt = ledger.execute(require(caller)?, call)?;
    Ok(receipt_json(&receipt))
}
