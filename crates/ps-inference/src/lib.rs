//! # ps-inference
//!
//! Estimation for the paid-search shutoff analysis:
//! - [`econometrics::did`]: two-group / two-period difference-in-differences on
//!   per-market log-revenue changes, with a normal-approximation interval.
//! - [`descriptive`]: daily mean revenue per group and the log revenue gap.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptive;
pub mod econometrics;

pub use descriptive::{DailyMeans, daily_group_means};
pub use econometrics::{DidResult, GroupStats, Z_95, did_from_diffs, did_from_summaries};
