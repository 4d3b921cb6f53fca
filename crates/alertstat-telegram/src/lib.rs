//! # alertstat telegram
//!
//! Everything that talks to Telegram: reading channel history from a
//! Telegram Desktop export, the Bot API client, report delivery over the Bot
//! API or into an outbox directory, and keyword-filtered live forwarding.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod delivery;
pub mod export;
pub mod forwarder;
pub mod source;
pub mod types;

pub use api::*;
pub use delivery::*;
pub use export::*;
pub use forwarder::*;
pub use source::*;
pub use types::*;
