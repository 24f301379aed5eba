use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("state file error: {0}")]
    State(String),

    #[error("no caller address given (use --caller, VEIL_CALLER or `caller` in the config file)")]
    MissingCaller,

    #[error(transparent)]
    Ledger(#[from] veil_ledger::LedgerError),
}
