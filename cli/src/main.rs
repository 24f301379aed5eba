//! veil: run token program transitions against a local state file.

use std::path::PathBuf;

use clap::Parser;
use veil_cli::{run, state, CliConfig, Command};
use veil_types::Address;
use veil_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "veil", about = "Private/public balance token ledger", version)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "VEIL_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger state file (created on first use).
    #[arg(long, env = "VEIL_STATE")]
    state: Option<PathBuf>,

    /// Address acting as `self.caller`.
    #[arg(long, env = "VEIL_CALLER")]
    caller: Option<Address>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VEIL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VEIL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    let config = CliConfig {
        state_path: cli.state.unwrap_or(file_config.state_path),
        caller: cli.caller.or(file_config.caller),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
    };

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    let ledger = state::load(&config.state_path)?;
    let mutates = !cli.command.is_query();
    let output = run(&ledger, config.caller.as_ref(), cli.command)?;
    if mutates {
        state::save(&ledger, &config.state_path)?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
