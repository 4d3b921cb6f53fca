//! # alertstat config
//!
//! Configuration schema, loading, and validation for alertstat.
//!
//! The configuration is built once at startup from an optional TOML file and
//! the process environment, validated, and then passed by value to every
//! component. Nothing here holds global state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
