//! CLI configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use veil_types::Address;
use veil_utils::LogFormat;

use crate::CliError;

/// Settings shared by every `veil` invocation.
///
/// Loaded from a TOML file via [`CliConfig::from_toml_file`]; command-line
/// flags and `VEIL_*` environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Where the ledger state is kept between invocations.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Default caller for transitions and queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Address>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter, e.g. "warn" or "info,veil_ledger=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./veil_state.bin")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CliConfig is always serializable to TOML")
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            caller: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "aleo1rhgdu77hgyqd3xjj8ucu3jj9r2krwz6mnzyd80gncr5fxcwlh5rsvzp9px";

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CliConfig::default();
        let parsed = CliConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config.state_path, PathBuf::from("./veil_state.bin"));
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "warn");
        assert!(config.caller.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = format!(
            r#"
            caller = "{ALICE}"
            log_format = "json"
            "#
        );
        let config = CliConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.caller.unwrap().as_str(), ALICE);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_caller_is_a_config_error() {
        let err = CliConfig::from_toml_str(r#"caller = "aleo1nope""#).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let err = CliConfig::from_toml_file(Path::new("/nonexistent/veil.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
