//! # ps-viz
//!
//! Visualization data artifacts for the paid-search analysis.
//!
//! Artifacts are flat, plot-friendly structures (aligned arrays rather than
//! nested objects) that serialize to JSON and feed `ps-viz-render`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Log revenue gap between control and treated markets over time.
pub mod gap;

/// Average daily revenue per group over time.
pub mod revenue;

pub use gap::LogGapArtifact;
pub use revenue::RevenueSeriesArtifact;
