//! Library half of the `veil` binary: configuration, state file handling
//! and subcommand execution.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use commands::{run, Command};
pub use config::CliConfig;
pub use error::CliError;
