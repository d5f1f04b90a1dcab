//! # ps-core
//!
//! Error type and panel data model shared by the paid-search
//! difference-in-differences crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Assignment, MarketSummary, Observation, Panel, Period, SummaryTable};
