//! Difference-in-Differences (DiD) estimator on per-market changes.
//!
//! Each market contributes one number, the change in mean log-revenue from the
//! pre to the post period. With `r̄₁` / `r̄₀` the mean change over treated /
//! control markets,
//!
//! ```text
//! γ̂  = r̄₁ − r̄₀
//! se = sqrt(s₁²/n₁ + s₀²/n₀)        (s² with n−1 denominator)
//! CI = γ̂ ± 1.96·se
//! ```
//!
//! On the level scale `exp(γ̂)` is the multiplicative revenue ratio attributable
//! to treatment; the interval bounds are exponentiated the same way.
//!
//! # References
//!
//! - Blake, Nosko & Tadelis (2015), "Consumer Heterogeneity and Paid Search
//!   Effectiveness: A Large-Scale Field Experiment." *Econometrica*.
//! - Angrist & Pischke, *Mostly Harmless Econometrics*, Ch. 5.

use ps_core::{Assignment, Error, Result, SummaryTable};
use serde::{Deserialize, Serialize};

/// Two-sided 95% critical value of the standard normal.
pub const Z_95: f64 = 1.96;

/// Sample mean and unbiased variance of one group's per-market changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Number of markets.
    pub n: usize,
    /// Mean change in log-revenue.
    pub mean: f64,
    /// Sample variance (n−1 denominator).
    pub variance: f64,
}

impl GroupStats {
    /// Compute mean and sample variance.
    ///
    /// Requires at least two finite values; the n−1 variance is undefined otherwise.
    pub fn from_diffs(diffs: &[f64]) -> Result<Self> {
        let n = diffs.len();
        if n == 0 {
            return Err(Error::Validation("group has no markets".into()));
        }
        if n < 2 {
            return Err(Error::Validation(
                "group has a single market; sample variance needs at least two".into(),
            ));
        }
        if let Some(bad) = diffs.iter().find(|d| !d.is_finite()) {
            return Err(Error::Validation(format!("non-finite log-revenue change: {bad}")));
        }

        let nf = n as f64;
        let mean = diffs.iter().sum::<f64>() / nf;
        let ss: f64 = diffs.iter().map(|d| (d - mean) * (d - mean)).sum();
        Ok(Self { n, mean, variance: ss / (nf - 1.0) })
    }

    /// Variance of the group mean, `s²/n`.
    pub fn variance_of_mean(&self) -> f64 {
        self.variance / self.n as f64
    }
}

/// Result of the two-group DiD estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidResult {
    /// Point estimate γ̂ (log-revenue units).
    pub gamma: f64,
    /// Standard error of γ̂.
    pub se: f64,
    /// 95% CI lower bound (log scale).
    pub ci_lower: f64,
    /// 95% CI upper bound (log scale).
    pub ci_upper: f64,
    /// `exp(gamma)`: multiplicative effect on revenue.
    pub gamma_exp: f64,
    /// `exp(ci_lower)`.
    pub ci_lower_exp: f64,
    /// `exp(ci_upper)`.
    pub ci_upper_exp: f64,
    /// Treated-group statistics.
    pub treated: GroupStats,
    /// Control-group statistics.
    pub control: GroupStats,
}

impl DidResult {
    /// Assemble the estimate from the two group summaries.
    pub fn from_groups(treated: GroupStats, control: GroupStats) -> Self {
        let gamma = treated.mean - control.mean;
        let se = (treated.variance_of_mean() + control.variance_of_mean()).sqrt();
        let ci_lower = gamma - Z_95 * se;
        let ci_upper = gamma + Z_95 * se;
        Self {
            gamma,
            se,
            ci_lower,
            ci_upper,
            gamma_exp: gamma.exp(),
            ci_lower_exp: ci_lower.exp(),
            ci_upper_exp: ci_upper.exp(),
            treated,
            control,
        }
    }

    /// Whether the 95% interval covers zero effect.
    pub fn ci_contains_zero(&self) -> bool {
        self.ci_lower <= 0.0 && 0.0 <= self.ci_upper
    }
}

/// DiD estimate from raw per-market changes.
pub fn did_from_diffs(treated: &[f64], control: &[f64]) -> Result<DidResult> {
    let t = GroupStats::from_diffs(treated).map_err(|e| in_group(Assignment::Treated, e))?;
    let c = GroupStats::from_diffs(control).map_err(|e| in_group(Assignment::Control, e))?;
    let res = DidResult::from_groups(t, c);
    if !(res.gamma.is_finite() && res.se.is_finite()) {
        return Err(Error::Computation(format!(
            "estimate overflowed (gamma = {}, se = {})",
            res.gamma, res.se
        )));
    }
    if ![res.gamma_exp, res.ci_lower_exp, res.ci_upper_exp].iter().all(|v| v.is_finite()) {
        return Err(Error::Computation(format!(
            "level-scale estimate overflowed (gamma = {}, exp(gamma) = {})",
            res.gamma, res.gamma_exp
        )));
    }
    tracing::debug!(
        n1 = t.n,
        n0 = c.n,
        r1 = t.mean,
        r0 = c.mean,
        var1 = t.variance,
        var0 = c.variance,
        gamma = res.gamma,
        se = res.se,
        "did estimate"
    );
    Ok(res)
}

/// DiD estimate from the two per-market summary tables.
pub fn did_from_summaries(treated: &SummaryTable, control: &SummaryTable) -> Result<DidResult> {
    if treated.assignment != Assignment::Treated || control.assignment != Assignment::Control {
        return Err(Error::Validation(format!(
            "expected (treated, untreated) summary tables, got ({}, {})",
            treated.assignment, control.assignment
        )));
    }
    did_from_diffs(&treated.diffs(), &control.diffs())
}

fn in_group(assignment: Assignment, err: Error) -> Error {
    match err {
        Error::Validation(msg) => Error::Validation(format!("{assignment} {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ps_core::MarketSummary;

    #[test]
    fn test_did_exact_scenario() {
        let res = did_from_diffs(&[0.1, 0.2, 0.3], &[0.0, 0.05, 0.1]).unwrap();

        assert_relative_eq!(res.treated.mean, 0.2, epsilon = 1e-12);
        assert_relative_eq!(res.control.mean, 0.05, epsilon = 1e-12);
        assert_relative_eq!(res.treated.variance, 0.01, epsilon = 1e-12);
        assert_relative_eq!(res.control.variance, 0.0025, epsilon = 1e-12);
        assert_eq!(res.treated.n, 3);
        assert_eq!(res.control.n, 3);

        assert_relative_eq!(res.gamma, 0.15, epsilon = 1e-12);
        let se = (0.01_f64 / 3.0 + 0.0025 / 3.0).sqrt();
        assert_relative_eq!(res.se, se, epsilon = 1e-12);
        assert_relative_eq!(res.se, 0.064_549_722_436_790_27, epsilon = 1e-12);
        assert_relative_eq!(res.ci_lower, 0.15 - 1.96 * se, epsilon = 1e-12);
        assert_relative_eq!(res.ci_upper, 0.15 + 1.96 * se, epsilon = 1e-12);
        assert_relative_eq!(res.ci_lower, 0.023_482_544_023_891_05, epsilon = 1e-12);
        assert_relative_eq!(res.ci_upper, 0.276_517_455_976_108_94, epsilon = 1e-12);
        assert!(!res.ci_contains_zero());
    }

    #[test]
    fn test_identical_groups_give_zero() {
        let diffs = [0.02, -0.01, 0.04, 0.0, 0.03];
        let res = did_from_diffs(&diffs, &diffs).unwrap();
        assert_relative_eq!(res.gamma, 0.0, epsilon = 1e-15);
        assert!(res.ci_contains_zero());
        assert_relative_eq!(res.gamma_exp, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_level_scale_is_exp_of_log_scale() {
        let res = did_from_diffs(&[-0.3, 0.1, 0.05, -0.02], &[0.2, 0.4, 0.1]).unwrap();
        assert_eq!(res.gamma_exp, res.gamma.exp());
        assert_eq!(res.ci_lower_exp, res.ci_lower.exp());
        assert_eq!(res.ci_upper_exp, res.ci_upper.exp());
        assert!(res.ci_lower_exp < res.gamma_exp && res.gamma_exp < res.ci_upper_exp);
    }

    #[test]
    fn test_ci_symmetric_and_se_formula() {
        let treated = [0.11, -0.07, 0.31, 0.02, 0.09, 0.15];
        let control = [0.01, 0.03, -0.02, 0.08];
        let res = did_from_diffs(&treated, &control).unwrap();

        assert_relative_eq!((res.ci_upper + res.ci_lower) / 2.0, res.gamma, epsilon = 1e-14);
        assert_relative_eq!(res.ci_upper - res.gamma, Z_95 * res.se, epsilon = 1e-14);

        let t = GroupStats::from_diffs(&treated).unwrap();
        let c = GroupStats::from_diffs(&control).unwrap();
        assert!(res.se >= 0.0);
        assert_relative_eq!(
            res.se,
            (t.variance / 6.0 + c.variance / 4.0).sqrt(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_zero_variance_groups() {
        let res = did_from_diffs(&[0.5, 0.5], &[0.25, 0.25]).unwrap();
        assert_eq!(res.se, 0.0);
        assert_eq!(res.ci_lower, res.ci_upper);
        assert_relative_eq!(res.gamma, 0.25);
    }

    #[test]
    fn test_empty_group_is_error() {
        let err = did_from_diffs(&[], &[0.1, 0.2]).unwrap_err();
        assert!(err.to_string().contains("treated group has no markets"), "{err}");
        let err = did_from_diffs(&[0.1, 0.2], &[]).unwrap_err();
        assert!(err.to_string().contains("untreated group has no markets"), "{err}");
    }

    #[test]
    fn test_single_market_and_non_finite_rejected() {
        assert!(did_from_diffs(&[0.1], &[0.1, 0.2]).is_err());
        assert!(did_from_diffs(&[0.1, f64::NAN], &[0.1, 0.2]).is_err());
        assert!(did_from_diffs(&[0.1, 0.2], &[f64::INFINITY, 0.2]).is_err());
    }

    #[test]
    fn test_overflow_is_computation_error() {
        let err = did_from_diffs(&[1e200, -1e200], &[0.1, 0.2]).unwrap_err();
        assert!(matches!(err, Error::Computation(_)), "{err}");
    }

    #[test]
    fn test_level_scale_overflow_is_computation_error() {
        // gamma ~ 800 is finite on the log scale, but exp(800) is not.
        let err = did_from_diffs(&[800.0, 801.0], &[0.0, 0.1]).unwrap_err();
        assert!(matches!(err, Error::Computation(_)), "{err}");
        assert!(err.to_string().contains("level-scale"), "{err}");
    }

    #[test]
    fn test_from_summaries() {
        let treated = SummaryTable::new(
            Assignment::Treated,
            vec![
                MarketSummary::new(1, 10.0, 10.1),
                MarketSummary::new(2, 10.0, 10.2),
                MarketSummary::new(3, 10.0, 10.3),
            ],
        );
        let control = SummaryTable::new(
            Assignment::Control,
            vec![
                MarketSummary::new(4, 9.0, 9.0),
                MarketSummary::new(5, 9.0, 9.05),
                MarketSummary::new(6, 9.0, 9.1),
            ],
        );
        let res = did_from_summaries(&treated, &control).unwrap();
        assert_relative_eq!(res.gamma, 0.15, epsilon = 1e-9);

        assert!(did_from_summaries(&control, &treated).is_err());
    }
}
