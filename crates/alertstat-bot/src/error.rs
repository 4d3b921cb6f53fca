//! Application-wide error types using thiserror.

use alertstat_common::AlertStatError;
use tokio_cron_scheduler::JobSchedulerError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Error raised by one of the library crates.
    #[error(transparent)]
    Core(#[from] AlertStatError),

    /// Cron scheduler error.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    /// A report step did not finish within the request timeout.
    #[error("{step} timed out after {seconds}s")]
    Timeout {
        /// Step that timed out.
        step: &'static str,
        /// Configured timeout.
        seconds: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Whether the process must exit instead of continuing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_fatal())
    }

    /// HTTP status of a failed Telegram request, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Core(e) => e.status_code(),
            _ => None,
        }
    }
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
