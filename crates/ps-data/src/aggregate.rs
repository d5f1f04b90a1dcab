//! Per-market pre/post aggregation.
//!
//! For one assignment group, rows are averaged per `(dma, period)` cell on the
//! log scale and reshaped to one [`MarketSummary`] per market. Duplicate rows in
//! a cell are tolerated by averaging.

use std::collections::BTreeMap;

use ps_core::{Assignment, Error, MarketSummary, Panel, Period, Result, SummaryTable};
use serde::{Deserialize, Serialize};

/// What to do with a market observed in only one of the two periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Abort with a validation error naming the market.
    #[default]
    Error,
    /// Exclude the market and log a warning.
    Drop,
}

#[derive(Debug, Default, Clone, Copy)]
struct CellMean {
    sum: f64,
    count: usize,
}

impl CellMean {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Pivot one assignment group into a per-market summary table.
///
/// Fails if the group has no rows, if a market lacks a period under
/// [`UnmatchedPolicy::Error`], or if no market survives under
/// [`UnmatchedPolicy::Drop`].
pub fn aggregate_group(
    panel: &Panel,
    assignment: Assignment,
    policy: UnmatchedPolicy,
) -> Result<SummaryTable> {
    let mut cells: BTreeMap<u32, [CellMean; 2]> = BTreeMap::new();
    for obs in panel.group(assignment) {
        let slot = match obs.period {
            Period::Pre => 0,
            Period::Post => 1,
        };
        cells.entry(obs.dma).or_default()[slot].push(obs.log_revenue());
    }

    if cells.is_empty() {
        return Err(Error::Validation(format!("{assignment} group has no observations")));
    }

    let mut rows = Vec::with_capacity(cells.len());
    let mut dropped = 0usize;
    for (dma, [pre, post]) in &cells {
        match (pre.mean(), post.mean()) {
            (Some(pre), Some(post)) => rows.push(MarketSummary::new(*dma, pre, post)),
            (pre, _) => {
                let missing = if pre.is_none() { "pre" } else { "post" };
                match policy {
                    UnmatchedPolicy::Error => {
                        return Err(Error::Validation(format!(
                            "{assignment} market {dma} has no {missing}-period observations"
                        )));
                    }
                    UnmatchedPolicy::Drop => {
                        tracing::warn!(
                            group = %assignment,
                            dma = *dma,
                            missing,
                            "dropping market without both periods"
                        );
                        dropped += 1;
                    }
                }
            }
        }
    }

    if rows.is_empty() {
        return Err(Error::Validation(format!(
            "no {assignment} market has both pre and post observations"
        )));
    }

    tracing::debug!(group = %assignment, markets = rows.len(), dropped, "group aggregated");
    Ok(SummaryTable::new(assignment, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ps_core::Observation;

    fn obs(dma: u32, period: Period, assignment: Assignment, revenue: f64) -> Observation {
        let day = match period {
            Period::Pre => 1,
            Period::Post => 28,
        };
        Observation {
            dma,
            date: NaiveDate::from_ymd_opt(2012, 5, day).unwrap(),
            revenue,
            period,
            assignment,
        }
    }

    #[test]
    fn pivots_and_averages_duplicates() {
        use Assignment::*;
        use Period::*;
        let panel = Panel::new(vec![
            obs(2, Pre, Treated, 10.0),
            obs(2, Pre, Treated, 1000.0),
            obs(2, Post, Treated, 50.0),
            obs(1, Pre, Treated, 4.0),
            obs(1, Post, Treated, 8.0),
            obs(3, Pre, Control, 1.0),
            obs(3, Post, Control, 1.0),
        ])
        .unwrap();

        let table = aggregate_group(&panel, Treated, UnmatchedPolicy::Error).unwrap();
        assert_eq!(table.assignment, Treated);
        assert_eq!(table.rows.iter().map(|r| r.dma).collect::<Vec<_>>(), vec![1, 2]);

        let m1 = &table.rows[0];
        assert_relative_eq!(m1.log_revenue_diff, 2.0_f64.ln(), epsilon = 1e-12);

        // Mean of logs, not log of means.
        let m2 = &table.rows[1];
        let pre = (10.0_f64.ln() + 1000.0_f64.ln()) / 2.0;
        assert_relative_eq!(m2.log_revenue_pre, pre, epsilon = 1e-12);
        assert_relative_eq!(m2.log_revenue_post, 50.0_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(m2.log_revenue_diff, 50.0_f64.ln() - pre, epsilon = 1e-12);

        let control = aggregate_group(&panel, Control, UnmatchedPolicy::Error).unwrap();
        assert_eq!(control.len(), 1);
        assert_relative_eq!(control.rows[0].log_revenue_diff, 0.0);
    }

    #[test]
    fn market_missing_post_period() {
        use Assignment::*;
        use Period::*;
        let panel = Panel::new(vec![
            obs(1, Pre, Treated, 4.0),
            obs(1, Post, Treated, 8.0),
            obs(2, Pre, Treated, 4.0),
        ])
        .unwrap();

        let err = aggregate_group(&panel, Treated, UnmatchedPolicy::Error).unwrap_err();
        assert!(err.to_string().contains("market 2 has no post-period"), "{err}");

        let table = aggregate_group(&panel, Treated, UnmatchedPolicy::Drop).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].dma, 1);
        assert!(table.diffs().iter().all(|d| d.is_finite()));
    }

    #[test]
    fn empty_group_errors() {
        let panel = Panel::new(vec![obs(1, Period::Pre, Assignment::Control, 1.0)]).unwrap();
        let err =
            aggregate_group(&panel, Assignment::Treated, UnmatchedPolicy::Drop).unwrap_err();
        assert!(err.to_string().contains("no observations"), "{err}");

        let err =
            aggregate_group(&panel, Assignment::Control, UnmatchedPolicy::Drop).unwrap_err();
        assert!(err.to_string().contains("both pre and post"), "{err}");
    }

    #[test]
    fn policy_deserializes() {
        let p: UnmatchedPolicy = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(p, UnmatchedPolicy::Drop);
        assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Error);
    }
}
