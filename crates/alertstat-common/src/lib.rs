//! # alertstat common
//!
//! Shared types, error taxonomy, and logging bootstrap for alertstat.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace: the channel message model consumed by the statistics
//! pipeline, the chat reference newtype, and the application error type.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::*;
pub use types::*;
