use super::{quoted_identifier, WarehouseStore};
use crate::{
    error::PipelineResult,
    generator::FinancialRecord,
    metrics::MetricsRecord,
    types::{format_month_timestamp, parse_month},
};
use rusqlite::params;

impl WarehouseStore {
    // ── Warehouse writer ──────────────────────────────────────────

    /// Replace `table` with exactly `records`: drop, recreate, insert.
    /// Runs in one transaction so readers never see a half-written table.
    pub fn replace_table(&mut self, table: &str, records: &[FinancialRecord]) -> PipelineResult<()> {
        let table = quoted_identifier(table)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (
                 month        TIMESTAMP,
                 revenue      REAL,
                 expenses     REAL,
                 sales_volume INTEGER
             );"
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} (month, revenue, expenses, sales_volume)
                 VALUES (?1, ?2, ?3, ?4)"
            ))?;
            for r in records {
                stmt.execute(params![
                    format_month_timestamp(r.month),
                    r.revenue,
                    r.expenses,
                    r.sales_volume,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("Replaced {table} with {} rows", records.len());
        Ok(())
    }

    /// Base columns only, in month order.
    pub fn load_table(&self, table: &str) -> PipelineResult<Vec<FinancialRecord>> {
        let table = quoted_identifier(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT month, revenue, expenses, sales_volume FROM {table} ORDER BY month"
        ))?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(month, revenue, expenses, sales_volume)| {
                Ok(FinancialRecord {
                    month: parse_month(&month)?,
                    revenue,
                    expenses,
                    sales_volume,
                })
            })
            .collect()
    }

    // ── Metrics query ─────────────────────────────────────────────

    /// Base columns plus profit, profit margin and revenue per unit,
    /// ordered by month. SQLite returns NULL on division by zero; those
    /// derived values come back as NaN.
    pub fn query_metrics(&self, table: &str) -> PipelineResult<Vec<MetricsRecord>> {
        let table = quoted_identifier(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                 month,
                 revenue,
                 expenses,
                 sales_volume,
                 (revenue - expenses)                 AS profit,
                 ((revenue - expenses) / revenue * 100) AS profit_margin,
                 (revenue / sales_volume)             AS revenue_per_unit
             FROM {table}
             ORDER BY month"
        ))?;

        let raw = stmt
            .query_map([], |row| {
                Ok(RawMetricsRow {
                    month: row.get(0)?,
                    revenue: row.get(1)?,
                    expenses: row.get(2)?,
                    sales_volume: row.get(3)?,
                    profit: row.get(4)?,
                    profit_margin: row.get(5)?,
                    revenue_per_unit: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(RawMetricsRow::into_record).collect()
    }
}

/// Query row before the month text is parsed.
struct RawMetricsRow {
    month: String,
    revenue: f64,
    expenses: f64,
    sales_volume: i64,
    profit: f64,
    profit_margin: Option<f64>,
    revenue_per_unit: Option<f64>,
}

impl RawMetricsRow {
    fn into_record(self) -> PipelineResult<MetricsRecord> {
        Ok(MetricsRecord {
            month: parse_month(&self.month)?,
            revenue: self.revenue,
            expenses: self.expenses,
            sales_volume: self.sales_volume,
            profit: self.profit,
            profit_margin: self.profit_margin.unwrap_or(f64::NAN),
            revenue_per_unit: self.revenue_per_unit.unwrap_or(f64::NAN),
        })
    }
}
