//! Derived monthly metrics and the run summary built from them.
//!
//! Derived columns are produced by the warehouse query (see store/financials.rs).
//! This module only holds their shape and post-query arithmetic.

use crate::types::Month;
use serde::{Deserialize, Serialize};

/// One row of the metrics query: base columns plus derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub month: Month,
    pub revenue: f64,
    pub expenses: f64,
    pub sales_volume: i64,
    pub profit: f64,
    /// Percent of revenue. NaN when revenue is zero.
    pub profit_margin: f64,
    /// NaN when sales volume is zero.
    pub revenue_per_unit: f64,
}

impl MetricsRecord {
    /// Copy with every money and ratio column rounded to cents.
    pub fn rounded(&self) -> Self {
        Self {
            month: self.month,
            revenue: round_to_cents(self.revenue),
            expenses: round_to_cents(self.expenses),
            sales_volume: self.sales_volume,
            profit: round_to_cents(self.profit),
            profit_margin: round_to_cents(self.profit_margin),
            revenue_per_unit: round_to_cents(self.revenue_per_unit),
        }
    }
}

/// Round to 2 decimals, ties to even on the scaled value.
/// NaN and infinities pass through unchanged.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    (value * 100.0).round_ties_even() / 100.0
}

pub fn round_for_report(records: &[MetricsRecord]) -> Vec<MetricsRecord> {
    records.iter().map(MetricsRecord::rounded).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub months: usize,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    /// Mean over months with a finite margin.
    pub mean_profit_margin: f64,
    pub best_month: Option<(Month, f64)>,
    pub worst_month: Option<(Month, f64)>,
}

impl MetricsSummary {
    pub fn from_records(records: &[MetricsRecord]) -> Self {
        let total_revenue = records.iter().map(|r| r.revenue).sum();
        let total_expenses = records.iter().map(|r| r.expenses).sum();
        let total_profit = records.iter().map(|r| r.profit).sum();

        let margins: Vec<f64> = records
            .iter()
            .map(|r| r.profit_margin)
            .filter(|m| m.is_finite())
            .collect();
        let mean_profit_margin = if margins.is_empty() {
            f64::NAN
        } else {
            margins.iter().sum::<f64>() / margins.len() as f64
        };

        let by_profit = |a: &&MetricsRecord, b: &&MetricsRecord| a.profit.total_cmp(&b.profit);
        let best_month = records.iter().max_by(by_profit).map(|r| (r.month, r.profit));
        let worst_month = records.iter().min_by(by_profit).map(|r| (r.month, r.profit));

        Self {
            months: records.len(),
            total_revenue,
            total_expenses,
            total_profit,
            mean_profit_margin,
            best_month,
            worst_month,
        }
    }
}
