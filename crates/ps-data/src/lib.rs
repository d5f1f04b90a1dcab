//! # ps-data
//!
//! Input side of the DID pipeline:
//! - [`panel`] reads the raw daily revenue CSV into a validated [`Panel`].
//! - [`aggregate`] pivots one assignment group into per-market pre/post summaries.
//! - [`summary`] reads and writes the intermediate summary tables that separate
//!   aggregation from estimation.
//!
//! [`Panel`]: ps_core::Panel

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod panel;
pub mod summary;

pub use aggregate::{UnmatchedPolicy, aggregate_group};
pub use panel::{REQUIRED_COLUMNS, load_panel, read_panel};
pub use summary::{read_summary_table, write_summary_table};
