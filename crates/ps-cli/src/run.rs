//! Pipeline configuration and the `preprocess` / `estimate` stages.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ps_core::{Assignment, Panel};
use ps_data::{UnmatchedPolicy, aggregate_group, load_panel};
use ps_inference::{DidResult, daily_group_means, did_from_summaries};
use ps_viz::{LogGapArtifact, RevenueSeriesArtifact};
use ps_viz_render::config::{VizConfig, resolve_value};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::report;

/// File locations and analysis options. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Raw daily panel CSV.
    pub input: PathBuf,
    /// Per-market summary of treated markets.
    pub treated_summary: PathBuf,
    /// Per-market summary of control markets.
    pub untreated_summary: PathBuf,
    /// LaTeX results table.
    pub table: PathBuf,
    /// Machine-readable estimate.
    pub result_json: PathBuf,
    /// Artifact manifest written by `run`.
    pub manifest: PathBuf,
    /// Average revenue figure; `.png` or `.svg`.
    pub figure_revenue: PathBuf,
    /// Log revenue gap figure; `.png` or `.svg`.
    pub figure_gap: PathBuf,
    /// Date marked on the figures. Defaults to the first post-period date in the panel.
    pub treatment_date: Option<NaiveDate>,
    /// Handling of markets observed in only one period.
    pub unmatched: UnmatchedPolicy,
    /// Render the descriptive figures during preprocessing.
    pub plots: bool,
    /// Figure styling, merged over the named theme.
    pub viz: serde_yaml_ng::Value,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: "input/PaidSearch.csv".into(),
            treated_summary: "temp/treated_pivot.csv".into(),
            untreated_summary: "temp/untreated_pivot.csv".into(),
            table: "output/tables/did_table.tex".into(),
            result_json: "output/tables/did_result.json".into(),
            manifest: "output/manifest.json".into(),
            figure_revenue: "output/figures/figure_5_2.png".into(),
            figure_gap: "output/figures/figure_5_3.png".into(),
            treatment_date: None,
            unmatched: UnmatchedPolicy::Error,
            plots: true,
            viz: serde_yaml_ng::Value::Null,
        }
    }
}

impl RunConfig {
    /// Figure styling with theme defaults filled in.
    pub fn viz_config(&self) -> Result<VizConfig> {
        resolve_value(self.viz.clone()).context("invalid viz section")
    }
}

/// Read a run config. A `.json` extension is parsed as JSON, anything else as YAML.
pub fn read_run_config(path: &Path) -> Result<RunConfig> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let cfg: RunConfig = if ext == "json" {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing config {}", path.display()))?
    } else {
        serde_yaml_ng::from_slice(&bytes)
            .with_context(|| format!("parsing config {}", path.display()))?
    };
    Ok(cfg)
}

/// Config from the given file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => read_run_config(p),
        None => Ok(RunConfig::default()),
    }
}

/// What the preprocessing stage observed and wrote.
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub treated_markets: usize,
    pub untreated_markets: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub written: Vec<PathBuf>,
}

/// Load the panel, write both summary tables and (optionally) the figures.
pub fn preprocess(cfg: &RunConfig, plots: bool) -> Result<PreprocessOutcome> {
    let panel = load_panel(&cfg.input)
        .with_context(|| format!("loading panel {}", cfg.input.display()))?;

    let treated = aggregate_group(&panel, Assignment::Treated, cfg.unmatched)?;
    let untreated = aggregate_group(&panel, Assignment::Control, cfg.unmatched)?;

    ps_data::write_summary_table(&cfg.treated_summary, &treated)
        .with_context(|| format!("writing {}", cfg.treated_summary.display()))?;
    ps_data::write_summary_table(&cfg.untreated_summary, &untreated)
        .with_context(|| format!("writing {}", cfg.untreated_summary.display()))?;
    let mut written = vec![cfg.treated_summary.clone(), cfg.untreated_summary.clone()];

    if plots {
        written.extend(render_figures(cfg, &panel)?);
    }

    let (first_date, last_date) = panel.date_range();
    Ok(PreprocessOutcome {
        treated_markets: panel.markets(Assignment::Treated).len(),
        untreated_markets: panel.markets(Assignment::Control).len(),
        first_date,
        last_date,
        written,
    })
}

fn render_figures(cfg: &RunConfig, panel: &Panel) -> Result<Vec<PathBuf>> {
    let viz = cfg.viz_config()?;
    let days = daily_group_means(panel);
    let treatment_date = cfg.treatment_date.or_else(|| panel.first_post_date());
    tracing::info!(days = days.len(), treatment_date = ?treatment_date, "rendering figures");

    let revenue = RevenueSeriesArtifact::from_daily(&days, treatment_date);
    let gap = LogGapArtifact::from_daily(&days, treatment_date);

    let figures = [
        ("revenue", serde_json::to_string(&revenue)?, &cfg.figure_revenue),
        ("log_gap", serde_json::to_string(&gap)?, &cfg.figure_gap),
    ];
    let mut written = Vec::with_capacity(figures.len());
    for (kind, json, path) in figures {
        ps_viz_render::render_to_file(&json, kind, path, &viz)
            .with_context(|| format!("rendering {}", path.display()))?;
        written.push(path.clone());
    }
    Ok(written)
}

/// Estimate from the summary tables and write the LaTeX table and JSON result.
pub fn estimate(cfg: &RunConfig) -> Result<(DidResult, Vec<PathBuf>)> {
    let treated = ps_data::read_summary_table(&cfg.treated_summary, Assignment::Treated)
        .with_context(|| format!("reading {}", cfg.treated_summary.display()))?;
    let untreated = ps_data::read_summary_table(&cfg.untreated_summary, Assignment::Control)
        .with_context(|| format!("reading {}", cfg.untreated_summary.display()))?;

    let res = did_from_summaries(&treated, &untreated)?;
    tracing::info!(gamma = res.gamma, se = res.se, "estimate complete");

    report::write_text(&cfg.table, &report::latex_table(&res))?;
    report::write_json(&cfg.result_json, &res)?;
    Ok((res, vec![cfg.table.clone(), cfg.result_json.clone()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_layout() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.input, PathBuf::from("input/PaidSearch.csv"));
        assert_eq!(cfg.treated_summary, PathBuf::from("temp/treated_pivot.csv"));
        assert_eq!(cfg.untreated_summary, PathBuf::from("temp/untreated_pivot.csv"));
        assert_eq!(cfg.table, PathBuf::from("output/tables/did_table.tex"));
        assert_eq!(cfg.figure_revenue, PathBuf::from("output/figures/figure_5_2.png"));
        assert_eq!(cfg.figure_gap, PathBuf::from("output/figures/figure_5_3.png"));
        assert_eq!(cfg.unmatched, UnmatchedPolicy::Error);
        assert!(cfg.plots);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "input: data/panel.csv\nunmatched: drop\ntreatment_date: 2012-05-22\n\
                    viz:\n  theme: report\n";
        let cfg: RunConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(cfg.input, PathBuf::from("data/panel.csv"));
        assert_eq!(cfg.unmatched, UnmatchedPolicy::Drop);
        assert_eq!(cfg.treatment_date, NaiveDate::from_ymd_opt(2012, 5, 22));
        assert_eq!(cfg.table, RunConfig::default().table);
        assert_eq!(cfg.viz_config().unwrap().theme, "report");
    }

    #[test]
    fn json_config_and_unknown_keys() {
        let cfg: RunConfig = serde_json::from_str(r#"{"plots": false}"#).unwrap();
        assert!(!cfg.plots);
        assert_eq!(cfg.viz_config().unwrap().theme, "classic");
        assert!(serde_json::from_str::<RunConfig>(r#"{"inptu": "x.csv"}"#).is_err());
    }
}
