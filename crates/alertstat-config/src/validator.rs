//! Startup validation. Every failure here is fatal.

use crate::schema::Config;
use alertstat_common::{AlertStatError, Result};
use std::str::FromStr;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first problem found.
    pub fn validate(config: &Config) -> Result<()> {
        if config.telegram.channel.is_empty() {
            return Err(AlertStatError::config(
                "TG_CHANNEL must be set to the channel whose history is scanned",
            ));
        }

        if config.telegram.history_path.as_os_str().is_empty() {
            return Err(AlertStatError::config(
                "TG_HISTORY_PATH must point to the channel history export",
            ));
        }

        if config.forward_source().is_some() && config.bot_token().is_none() {
            return Err(AlertStatError::config(
                "forwarding from TG_FORWARD_FROM requires TG_BOT_TOKEN",
            ));
        }

        if config.telegram.request_timeout_seconds == 0 {
            return Err(AlertStatError::validation_field(
                "request timeout must be at least one second",
                "telegram.request_timeout_seconds",
            ));
        }

        if config.forward_source().is_some()
            && config.forwarding.poll_timeout_seconds >= config.telegram.request_timeout_seconds
        {
            return Err(AlertStatError::validation_field(
                "long-polling timeout must be shorter than the request timeout",
                "forwarding.poll_timeout_seconds",
            ));
        }

        if config.forward_source().is_some() && config.forwarding.keywords.is_empty() {
            return Err(AlertStatError::validation_field(
                "forwarding needs at least one keyword",
                "forwarding.keywords",
            ));
        }

        validate_cron_expression(&config.report.weekly_cron, "report.weekly_cron")?;
        validate_cron_expression(&config.report.monthly_cron, "report.monthly_cron")?;

        Ok(())
    }
}

/// Parses a six-field cron expression (sec min hour day month weekday).
pub fn validate_cron_expression(cron_expr: &str, field: &str) -> Result<()> {
    if cron_expr.split_whitespace().count() != 6 {
        return Err(AlertStatError::validation_field(
            format!("cron expression {cron_expr:?} needs six fields (sec min hour day month weekday)"),
            field,
        ));
    }

    cron::Schedule::from_str(cron_expr).map(|_| ()).map_err(|e| {
        AlertStatError::validation_field(format!("invalid cron expression {cron_expr:?}: {e}"), field)
    })
}
