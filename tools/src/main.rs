//! report-runner: runs the monthly financial reporting pipeline once.
//!
//! Usage:
//!   report-runner
//!
//! Artifacts land in the working directory. A `finreport.json` there, if
//! present, overrides any subset of the defaults. RUST_LOG sets verbosity.

use anyhow::{Context, Result};
use finreport_core::{config::PipelineConfig, pipeline::Pipeline};

const CONFIG_FILE: &str = "finreport.json";

fn main() -> Result<()> {
    env_logger::init();

    println!("Starting Financial Reporting Automation Pipeline...");

    let config = PipelineConfig::load_or_default(CONFIG_FILE)
        .with_context(|| format!("loading {CONFIG_FILE}"))?;
    let outcome = Pipeline::new(config).run().context("pipeline run failed")?;

    let workbook = outcome
        .workbook
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.workbook.display().to_string());
    println!("Financial report generated and saved to '{workbook}'.");

    if let (Some((best, best_profit)), Some((worst, worst_profit))) =
        (outcome.summary.best_month, outcome.summary.worst_month)
    {
        log::info!("Best month {best} ({best_profit:.2}), worst month {worst} ({worst_profit:.2})");
    }
    log::debug!("{} artifacts written", outcome.artifacts().len());

    println!("Pipeline completed successfully!");
    Ok(())
}
