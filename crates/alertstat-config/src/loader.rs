//! Configuration loading from an optional TOML file and the process environment.

use crate::schema::Config;
use alertstat_common::{AlertStatError, ChatRef, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Channel whose history is scanned.
pub const ENV_CHANNEL: &str = "TG_CHANNEL";
/// Report destination.
pub const ENV_SEND_TO: &str = "TG_SEND_TO";
/// Chat watched for forwarding.
pub const ENV_FORWARD_FROM: &str = "TG_FORWARD_FROM";
/// Forwarding destination.
pub const ENV_FORWARD_TO: &str = "TG_FORWARD_TO";
/// Bot token selecting the Bot API transport.
pub const ENV_BOT_TOKEN: &str = "TG_BOT_TOKEN";
/// Silent delivery flag.
pub const ENV_SEND_SILENT: &str = "SEND_SILENT";
/// Channel history export path.
pub const ENV_HISTORY_PATH: &str = "TG_HISTORY_PATH";
/// Working directory.
pub const ENV_DATA_DIR: &str = "ALERTSTAT_DATA_DIR";
/// Outbound request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT: &str = "ALERTSTAT_REQUEST_TIMEOUT";

/// Configuration loader: `.env`, then the TOML file, then environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    skip_dotenv: bool,
}

impl ConfigLoader {
    /// Creates a loader that reads only the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the given TOML file before applying environment overrides.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Does not read a `.env` file from the working directory.
    #[must_use]
    pub fn without_dotenv(mut self) -> Self {
        self.skip_dotenv = true;
        self
    }

    /// Loads and validates the configuration from the process environment.
    pub fn load(&self) -> Result<Config> {
        if !self.skip_dotenv {
            match dotenvy::dotenv() {
                Ok(path) => debug!("Loaded environment from {}", path.display()),
                Err(e) if e.not_found() => {}
                Err(e) => return Err(AlertStatError::config_with_source("failed to read .env", e)),
            }
        }
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Loads and validates the configuration using `lookup` for environment values.
    pub fn load_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let mut config = match &self.path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        info!(
            channel = %config.telegram.channel,
            transport = ?config.transport(),
            forwarding = config.forward_source().is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parses a TOML file without applying overrides or validating.
    pub fn from_file(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AlertStatError::config_with_source(format!("cannot read {}", path.display()), e)
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses TOML text without applying overrides or validating.
    pub fn from_toml_str(raw: &str) -> Result<Config> {
        toml::from_str(raw)
            .map_err(|e| AlertStatError::config_with_source("invalid configuration file", e))
    }
}

impl Config {
    /// Applies environment overrides. Blank values count as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(channel) = get(ENV_CHANNEL) {
            self.telegram.channel = ChatRef::new(channel);
        }
        if let Some(send_to) = get(ENV_SEND_TO) {
            self.telegram.send_to = Some(ChatRef::new(send_to));
        }
        if let Some(token) = get(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(silent) = get(ENV_SEND_SILENT) {
            self.telegram.silent = parse_flag(&silent);
        }
        if let Some(path) = get(ENV_HISTORY_PATH) {
            self.telegram.history_path = PathBuf::from(path);
        }
        if let Some(timeout) = get(ENV_REQUEST_TIMEOUT) {
            self.telegram.request_timeout_seconds = timeout.parse().map_err(|_| {
                AlertStatError::validation_field(
                    format!("{ENV_REQUEST_TIMEOUT} must be a number of seconds, got {timeout:?}"),
                    "telegram.request_timeout_seconds",
                )
            })?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.report.data_dir = PathBuf::from(dir);
        }
        if let Some(from) = get(ENV_FORWARD_FROM) {
            self.forwarding.from = Some(ChatRef::new(from));
        }
        if let Some(to) = get(ENV_FORWARD_TO) {
            self.forwarding.to = Some(ChatRef::new(to));
        }
        Ok(())
    }
}

/// Interprets `1`, `true`, `yes` and `on` (any case) as enabled.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(parse_flag("On"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .load_with(env(&[
                (ENV_CHANNEL, "@vodokanal"),
                (ENV_SEND_TO, "-100200"),
                (ENV_SEND_SILENT, "yes"),
                (ENV_BOT_TOKEN, " 123:abc "),
                (ENV_DATA_DIR, "/tmp/alertstat"),
            ]))
            .unwrap();

        assert_eq!(config.telegram.channel.as_str(), "@vodokanal");
        assert_eq!(config.report_destination().as_str(), "-100200");
        assert_eq!(config.forward_destination().as_str(), "@vodokanal");
        assert!(config.telegram.silent);
        assert_eq!(config.bot_token(), Some("123:abc"));
        assert_eq!(config.report.data_dir, PathBuf::from("/tmp/alertstat"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let result = ConfigLoader::new().load_with(env(&[(ENV_CHANNEL, "   ")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ConfigLoader::new().load_with(env(&[
            (ENV_CHANNEL, "@vodokanal"),
            (ENV_REQUEST_TIMEOUT, "soon"),
        ]));
        let err = result.unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_toml_then_env() {
        let mut config = ConfigLoader::from_toml_str(
            r#"
[telegram]
channel = "@from_file"
silent = true

[forwarding]
from = "@source"
keywords = ["авария"]
"#,
        )
        .unwrap();
        config
            .apply_env(env(&[(ENV_CHANNEL, "@from_env")]))
            .unwrap();

        assert_eq!(config.telegram.channel.as_str(), "@from_env");
        assert!(config.telegram.silent);
        assert_eq!(config.forwarding.keywords, vec!["авария".to_string()]);
        assert_eq!(config.telegram.request_timeout_seconds, 90);
    }
}
