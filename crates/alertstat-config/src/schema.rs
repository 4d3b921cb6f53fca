//! Configuration schema definitions using serde.

use alertstat_common::{ChatRef, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::validator::ConfigValidator;

/// Main configuration structure for alertstat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram channels, credentials and transport settings.
    pub telegram: TelegramConfig,
    /// Report generation settings.
    pub report: ReportConfig,
    /// Live keyword forwarding settings.
    pub forwarding: ForwardingConfig,
    /// Logging settings.
    pub logging: LogConfig,
}

/// Telegram configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Channel whose history is scanned.
    pub channel: ChatRef,
    /// Destination for reports; the scanned channel when unset.
    pub send_to: Option<ChatRef>,
    /// Bot token. Its presence selects the Bot API transport.
    pub bot_token: Option<String>,
    /// Deliver without notification sound.
    pub silent: bool,
    /// Bounded timeout for every outbound request, in seconds.
    pub request_timeout_seconds: u64,
    /// Path to the channel history export (`result.json`).
    pub history_path: PathBuf,
}

/// Report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Working directory for rendered charts, the outbox and session data.
    pub data_dir: PathBuf,
    /// Six-field cron expression for the weekly report.
    pub weekly_cron: String,
    /// Six-field cron expression for the monthly report.
    pub monthly_cron: String,
}

/// Keyword forwarding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Chat to watch. Forwarding is disabled when unset.
    pub from: Option<ChatRef>,
    /// Destination for forwarded posts; the scanned channel when unset.
    pub to: Option<ChatRef>,
    /// Case-insensitive substrings that select a post for forwarding.
    pub keywords: Vec<String>,
    /// Long-polling timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Directory for a daily-rotated log file.
    pub file_dir: Option<PathBuf>,
}

/// Which delivery transport the configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Publish through the Bot API with the configured token.
    BotApi,
    /// Hand finished reports to the session client through the outbox directory.
    Outbox,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }

    /// Destination for reports.
    pub fn report_destination(&self) -> &ChatRef {
        self.telegram
            .send_to
            .as_ref()
            .unwrap_or(&self.telegram.channel)
    }

    /// Destination for forwarded posts.
    pub fn forward_destination(&self) -> &ChatRef {
        self.forwarding.to.as_ref().unwrap_or(&self.telegram.channel)
    }

    /// Source chat for forwarding, if enabled.
    pub fn forward_source(&self) -> Option<&ChatRef> {
        self.forwarding.from.as_ref().filter(|chat| !chat.is_empty())
    }

    /// Bot token, if one is configured and non-blank.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Transport selected by the presence of a bot token.
    pub fn transport(&self) -> TransportKind {
        if self.bot_token().is_some() {
            TransportKind::BotApi
        } else {
            TransportKind::Outbox
        }
    }

    /// Directory where the outbox transport drops finished reports.
    pub fn outbox_dir(&self) -> PathBuf {
        self.report.data_dir.join("outbox")
    }

    /// File describing the bot identity written by `--auth`.
    pub fn session_file(&self) -> PathBuf {
        self.report.data_dir.join("session.json")
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("channel", &self.channel)
            .field("send_to", &self.send_to)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("silent", &self.silent)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("history_path", &self.history_path)
            .finish()
    }
}
