//! Synthetic monthly financial table.
//!
//! DRAW ORDER (fixed, never reordered):
//!   1. all revenue draws
//!   2. all expense draws
//!   3. all sales volume draws
//! Floors and rounding are applied afterwards, in the same column order.
//! Changing the order changes every value produced for a given seed.

use crate::{
    config::GeneratorConfig,
    error::{PipelineError, PipelineResult},
    metrics::round_to_cents,
    rng::SeededRng,
    types::{month_ends, Month, MONTH_DATE_FORMAT},
};
use serde::{Serialize, Serializer};
use std::{fs, path::Path};

/// One generated month. Field order is the raw CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRecord {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub revenue: f64,
    pub expenses: f64,
    pub sales_volume: i64,
}

fn serialize_month<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&month.format(MONTH_DATE_FORMAT))
}

/// Build the base table from `config`, consuming draws from `rng`.
pub fn generate(config: &GeneratorConfig, rng: &mut SeededRng) -> PipelineResult<Vec<FinancialRecord>> {
    let n = config.num_months;
    let months = month_ends(config.start_year, config.start_month, n).ok_or_else(|| {
        PipelineError::InvalidConfig(format!(
            "start month {}-{:02} is not a calendar month",
            config.start_year, config.start_month
        ))
    })?;

    let revenue = rng.normal_draws(config.revenue.mean, config.revenue.std_dev, n)?;
    let expenses = rng.normal_draws(config.expenses.mean, config.expenses.std_dev, n)?;
    let volume = rng.poisson_draws(config.sales_volume.mean, n)?;

    let revenue = revenue.into_iter().map(|x| round_to_cents(x.max(config.revenue.floor)));
    let expenses = expenses.into_iter().map(|x| round_to_cents(x.max(config.expenses.floor)));
    // Floor on the integer draw so volume never picks up a fraction.
    let volume = volume.into_iter().map(|v| v.max(config.sales_volume.floor) as i64);

    let records: Vec<FinancialRecord> = months
        .into_iter()
        .zip(revenue)
        .zip(expenses)
        .zip(volume)
        .map(|(((month, revenue), expenses), sales_volume)| FinancialRecord {
            month,
            revenue,
            expenses,
            sales_volume,
        })
        .collect();

    log::debug!(
        "{} stream produced {} months starting {}",
        rng.name,
        records.len(),
        records.first().map(|r| r.month.to_string()).unwrap_or_default()
    );
    Ok(records)
}

/// Write the raw table as CSV with a header row and no index column.
/// Creates the parent directory when it is missing.
pub fn write_raw_csv(path: &Path, records: &[FinancialRecord]) -> PipelineResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            log::debug!("Creating directory {}", dir.display());
            fs::create_dir_all(dir).map_err(PipelineError::io(dir))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(PipelineError::io(path))?;
    Ok(())
}
