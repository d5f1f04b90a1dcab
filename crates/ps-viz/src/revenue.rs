use chrono::NaiveDate;
use ps_inference::DailyMeans;
use serde::{Deserialize, Serialize};

/// Plot-friendly artifact for average revenue per day, treatment vs control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSeriesArtifact {
    /// Days, ascending.
    pub dates: Vec<NaiveDate>,
    /// Mean control revenue aligned with `dates` (`None` where unobserved).
    pub control: Vec<Option<f64>>,
    /// Mean treated revenue aligned with `dates` (`None` where unobserved).
    pub treated: Vec<Option<f64>>,
    /// Day paid search was switched off in treated markets.
    pub treatment_date: Option<NaiveDate>,
}

impl RevenueSeriesArtifact {
    /// Build from the daily group means.
    pub fn from_daily(days: &[DailyMeans], treatment_date: Option<NaiveDate>) -> Self {
        Self {
            dates: days.iter().map(|d| d.date).collect(),
            control: days.iter().map(|d| d.control).collect(),
            treated: days.iter().map(|d| d.treated).collect(),
            treatment_date,
        }
    }

    /// True if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Smallest and largest observed revenue over both series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.control.iter().chain(self.treated.iter()).flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
    }
}
