//! Econometrics & causal inference.
//!
//! This module provides the canonical two-group / two-period
//! **Difference-in-Differences** estimator computed from per-market
//! pre/post changes, with a closed-form standard error and a 95%
//! normal-approximation interval reported on both log and level scales.

pub mod did;

pub use did::{DidResult, GroupStats, Z_95, did_from_diffs, did_from_summaries};
