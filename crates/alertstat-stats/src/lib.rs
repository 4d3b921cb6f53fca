//! # alertstat stats
//!
//! The statistics core: extracting announced times from free text, deciding
//! which channel posts count, bucketing a newest-first message stream into
//! per-day and per-hour frequency tables, and summarizing the daily counts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod summary;

pub use aggregator::*;
pub use classifier::*;
pub use extractor::*;
pub use summary::*;
