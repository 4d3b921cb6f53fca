//! Default values for every configuration section.

use crate::schema::*;
use alertstat_common::ChatRef;
use std::path::PathBuf;

/// Keywords that select an outage announcement for forwarding.
pub const DEFAULT_FORWARD_KEYWORDS: [&str; 6] = [
    "аварийные",
    "работы",
    "продлены",
    "аварийных",
    "работ",
    "продлеваются",
];

/// Monday, 00:00:00.
pub const DEFAULT_WEEKLY_CRON: &str = "0 0 0 * * Mon";

/// First day of the month, 00:00:00.
pub const DEFAULT_MONTHLY_CRON: &str = "0 0 0 1 * *";

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            report: ReportConfig::default(),
            forwarding: ForwardingConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            channel: ChatRef::new(""),
            send_to: None,
            bot_token: None,
            silent: false,
            request_timeout_seconds: 90,
            history_path: PathBuf::from("data/export/result.json"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            weekly_cron: DEFAULT_WEEKLY_CRON.to_string(),
            monthly_cron: DEFAULT_MONTHLY_CRON.to_string(),
        }
    }
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            keywords: DEFAULT_FORWARD_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            poll_timeout_seconds: 25,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_dir: None,
        }
    }
}
