//! # alertstat bot
//!
//! The `alertstat` binary: command line, application wiring, cron scheduling
//! of the weekly and monthly reports, and the report job itself.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;
pub mod job;
pub mod scheduler;

pub use app::*;
pub use cli::*;
pub use error::*;
pub use job::*;
pub use scheduler::*;
