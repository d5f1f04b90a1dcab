use chrono::NaiveDate;
use ps_inference::DailyMeans;
use serde::{Deserialize, Serialize};

/// Plot-friendly artifact for `ln(mean control revenue) - ln(mean treated revenue)` per day.
///
/// Days on which either group is unobserved are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogGapArtifact {
    /// Days, ascending.
    pub dates: Vec<NaiveDate>,
    /// Log gap aligned with `dates`.
    pub gap: Vec<f64>,
    /// Day paid search was switched off in treated markets.
    pub treatment_date: Option<NaiveDate>,
    /// Mean gap over days before `treatment_date`.
    pub pre_mean: Option<f64>,
    /// Mean gap over days on or after `treatment_date`.
    pub post_mean: Option<f64>,
}

impl LogGapArtifact {
    /// Build from the daily group means.
    pub fn from_daily(days: &[DailyMeans], treatment_date: Option<NaiveDate>) -> Self {
        let (dates, gap): (Vec<NaiveDate>, Vec<f64>) =
            days.iter().filter_map(|d| d.log_gap().map(|g| (d.date, g))).unzip();

        let (pre_mean, post_mean) = match treatment_date {
            Some(t) => {
                let pick = |post: bool| {
                    let vals: Vec<f64> = dates
                        .iter()
                        .zip(&gap)
                        .filter(|(d, _)| (**d >= t) == post)
                        .map(|(_, g)| *g)
                        .collect();
                    (!vals.is_empty()).then(|| vals.iter().sum::<f64>() / vals.len() as f64)
                };
                (pick(false), pick(true))
            }
            None => (None, None),
        };

        Self { dates, gap, treatment_date, pre_mean, post_mean }
    }

    /// True if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
