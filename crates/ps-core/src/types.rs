//! Panel data types: raw daily observations and per-market pre/post summaries.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pre/post split encoded by the `treatment_period` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// `treatment_period = 0`
    Pre,
    /// `treatment_period = 1`
    Post,
}

impl Period {
    /// Parse the 0/1 flag.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Period::Pre),
            1 => Ok(Period::Post),
            other => {
                Err(Error::Validation(format!("treatment_period must be 0 or 1, got {other}")))
            }
        }
    }
}

/// Group assignment encoded by the `search_stays_on` column.
///
/// Paid search was switched off in treated markets, so `search_stays_on = 0`
/// marks treatment and `search_stays_on = 1` marks control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// Search ads turned off (`search_stays_on = 0`).
    Treated,
    /// Search ads stayed on (`search_stays_on = 1`).
    Control,
}

impl Assignment {
    /// Parse the 0/1 `search_stays_on` flag.
    pub fn from_search_stays_on(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(Assignment::Treated),
            1 => Ok(Assignment::Control),
            other => {
                Err(Error::Validation(format!("search_stays_on must be 0 or 1, got {other}")))
            }
        }
    }

    /// Value of the `search_stays_on` column for this group.
    pub fn search_stays_on(self) -> u8 {
        match self {
            Assignment::Treated => 0,
            Assignment::Control => 1,
        }
    }

    /// Short label used in file names and log fields.
    pub fn label(self) -> &'static str {
        match self {
            Assignment::Treated => "treated",
            Assignment::Control => "untreated",
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the raw panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Market (DMA) identifier.
    pub dma: u32,
    /// Calendar day.
    pub date: NaiveDate,
    /// Daily revenue, strictly positive.
    pub revenue: f64,
    /// Pre or post treatment.
    pub period: Period,
    /// Treated or control market.
    pub assignment: Assignment,
}

impl Observation {
    /// Natural log of revenue.
    pub fn log_revenue(&self) -> f64 {
        self.revenue.ln()
    }
}

/// Validated, non-empty panel of observations.
#[derive(Debug, Clone)]
pub struct Panel {
    observations: Vec<Observation>,
}

impl Panel {
    /// Wrap observations, checking the panel is non-empty and every revenue is positive.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(Error::Validation("panel contains no observations".into()));
        }
        if let Some(bad) = observations.iter().find(|o| !(o.revenue.is_finite() && o.revenue > 0.0))
        {
            return Err(Error::Validation(format!(
                "revenue must be positive and finite (dma {}, date {}): got {}",
                bad.dma, bad.date, bad.revenue
            )));
        }
        Ok(Self { observations })
    }

    /// All observations in file order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false for a constructed panel; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows belonging to one assignment group.
    pub fn group(&self, assignment: Assignment) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.assignment == assignment)
    }

    /// Distinct market ids in one assignment group.
    pub fn markets(&self, assignment: Assignment) -> BTreeSet<u32> {
        self.group(assignment).map(|o| o.dma).collect()
    }

    /// Earliest and latest date in the panel.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let first = self.observations[0].date;
        self.observations
            .iter()
            .fold((first, first), |(lo, hi), o| (lo.min(o.date), hi.max(o.date)))
    }

    /// Earliest date flagged as post-treatment, if any.
    pub fn first_post_date(&self) -> Option<NaiveDate> {
        self.observations.iter().filter(|o| o.period == Period::Post).map(|o| o.date).min()
    }
}

/// Per-market pre/post mean log-revenue and their difference.
///
/// Field names double as the column header of the intermediate summary CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    /// Market (DMA) identifier.
    pub dma: u32,
    /// Mean log-revenue before treatment.
    pub log_revenue_pre: f64,
    /// Mean log-revenue after treatment.
    pub log_revenue_post: f64,
    /// `log_revenue_post - log_revenue_pre`.
    pub log_revenue_diff: f64,
}

impl MarketSummary {
    /// Build a summary, deriving the difference.
    pub fn new(dma: u32, log_revenue_pre: f64, log_revenue_post: f64) -> Self {
        let log_revenue_diff = log_revenue_post - log_revenue_pre;
        Self { dma, log_revenue_pre, log_revenue_post, log_revenue_diff }
    }
}

/// One row per market for a single assignment group, ordered by market id.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    /// Which group these markets belong to.
    pub assignment: Assignment,
    /// Market rows.
    pub rows: Vec<MarketSummary>,
}

impl SummaryTable {
    /// Build a table, sorting rows by market id.
    pub fn new(assignment: Assignment, mut rows: Vec<MarketSummary>) -> Self {
        rows.sort_by_key(|r| r.dma);
        Self { assignment, rows }
    }

    /// Number of markets.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no market survived aggregation.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-market log-revenue differences in row order.
    pub fn diffs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_revenue_diff).collect()
    }
}
