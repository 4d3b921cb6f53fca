//! # alertstat graphs
//!
//! Bar chart rendering for the statistics reports.
//!
//! Charts are described by backend-independent [`ChartDescriptor`]s and drawn
//! with plotters on a blocking worker. [`ReportAssembler`] turns an
//! aggregation into the three report charts plus the album caption.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod chart;
pub mod renderer;
pub mod report;

pub use chart::*;
pub use renderer::*;
pub use report::*;
