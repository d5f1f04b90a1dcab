//! psdid: paid-search difference-in-differences CLI

mod report;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use run::RunConfig;

#[derive(Parser)]
#[command(name = "psdid")]
#[command(about = "Difference-in-differences analysis of a paid-search shutdown experiment")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// Run configuration (YAML, or JSON by `.json` extension). Missing keys use defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the raw panel, write per-market summary tables and descriptive figures
    Preprocess {
        /// Skip the figures.
        #[arg(long)]
        no_plots: bool,
    },

    /// Estimate the effect from the summary tables and write the results table
    Estimate,

    /// Preprocess, estimate and write an artifact manifest
    Run {
        /// Skip the figures.
        #[arg(long)]
        no_plots: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    let cfg = run::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Preprocess { no_plots } => cmd_preprocess(&cfg, no_plots).map(|_| ()),
        Commands::Estimate => cmd_estimate(&cfg).map(|_| ()),
        Commands::Run { no_plots } => cmd_run(&cfg, no_plots),
    }
}

fn cmd_preprocess(cfg: &RunConfig, no_plots: bool) -> Result<Vec<PathBuf>> {
    let out = run::preprocess(cfg, cfg.plots && !no_plots)?;
    println!("Treated DMAs: {}", out.treated_markets);
    println!("Untreated DMAs: {}", out.untreated_markets);
    println!("Date range: {} to {}", out.first_date, out.last_date);
    for path in &out.written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(out.written)
}

fn cmd_estimate(cfg: &RunConfig) -> Result<Vec<PathBuf>> {
    let (res, written) = run::estimate(cfg)?;
    println!("{}", report::console_summary(&res));
    for path in &written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(written)
}

fn cmd_run(cfg: &RunConfig, no_plots: bool) -> Result<()> {
    let mut artifacts = cmd_preprocess(cfg, no_plots)?;
    artifacts.extend(cmd_estimate(cfg)?);
    report::write_manifest(&cfg.manifest, &artifacts)?;
    eprintln!("Wrote {}", cfg.manifest.display());
    Ok(())
}
