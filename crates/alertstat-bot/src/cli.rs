//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

use crate::job::ReportKind;

/// Posts weekly and monthly outage statistics for a Telegram channel and
/// forwards outage announcements from another chat.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Schedule the weekly report (Monday 00:00 UTC, last 7 days).
    #[arg(long)]
    pub weekly: bool,

    /// Schedule the monthly report (1st day 00:00 UTC, previous month's length).
    #[arg(long)]
    pub monthly: bool,

    /// Also run the enabled reports once right away.
    #[arg(long)]
    pub run_now: bool,

    /// Verify the bot credentials, write the session file and exit.
    #[arg(long)]
    pub auth: bool,

    /// Configuration file (TOML).
    #[arg(short, long, env = "ALERTSTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, overriding the configured level.
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Report kinds enabled on the command line.
    pub fn report_kinds(&self) -> Vec<ReportKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.weekly {
            kinds.push(ReportKind::Weekly);
        }
        if self.monthly {
            kinds.push(ReportKind::Monthly);
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from(["alertstat", "--weekly", "--monthly", "--run-now"]).unwrap();
        assert!(args.run_now);
        assert!(!args.auth);
        assert_eq!(args.report_kinds(), vec![ReportKind::Weekly, ReportKind::Monthly]);
    }

    #[test]
    fn test_config_and_log_level() {
        let args = Args::try_parse_from(["alertstat", "-c", "alertstat.toml", "--log-level", "debug", "--auth"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("alertstat.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.auth);
        assert!(args.report_kinds().is_empty());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["alertstat", "--daily"]).is_err());
    }
}
