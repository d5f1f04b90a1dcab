//! Descriptive daily series: mean revenue per assignment group.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ps_core::{Assignment, Panel};
use serde::{Deserialize, Serialize};

/// Mean revenue across markets on one day, per group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMeans {
    /// Calendar day.
    pub date: NaiveDate,
    /// Mean revenue over treated markets (`None` if no treated row that day).
    pub treated: Option<f64>,
    /// Mean revenue over control markets (`None` if no control row that day).
    pub control: Option<f64>,
}

impl DailyMeans {
    /// `ln(control) - ln(treated)`, defined only when both groups are observed.
    pub fn log_gap(&self) -> Option<f64> {
        match (self.control, self.treated) {
            (Some(c), Some(t)) => Some(c.ln() - t.ln()),
            _ => None,
        }
    }
}

/// Group the panel by (date, assignment) and average revenue, ordered by date.
pub fn daily_group_means(panel: &Panel) -> Vec<DailyMeans> {
    // [treated, control] running (sum, count) per day
    let mut days: BTreeMap<NaiveDate, [(f64, usize); 2]> = BTreeMap::new();
    for obs in panel.observations() {
        let slot = match obs.assignment {
            Assignment::Treated => 0,
            Assignment::Control => 1,
        };
        let cell = &mut days.entry(obs.date).or_default()[slot];
        cell.0 += obs.revenue;
        cell.1 += 1;
    }

    let mean = |(sum, count): (f64, usize)| (count > 0).then(|| sum / count as f64);
    days.into_iter()
        .map(|(date, [t, c])| DailyMeans { date, treated: mean(t), control: mean(c) })
        .collect()
}
