//! # alertstat i18n
//!
//! Russian pluralization and the Fluent message catalogue used for report
//! captions, chart titles, axis labels and weekday names.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod messages;
pub mod pluralization;

pub use messages::*;
pub use pluralization::*;
