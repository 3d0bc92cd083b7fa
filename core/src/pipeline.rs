//! The reporting pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Generate     synthetic base table + raw CSV
//!   2. Store        replace the warehouse table
//!   3. Query        derived metrics, ordered by month
//!   4. Chart        four PNG charts
//!   5. Export       rounded metrics workbook
//!
//! RULES:
//!   - Each stage consumes only the previous stage's output.
//!   - Each stage opens and closes its own resources. The writer's
//!     connection is closed before the query stage opens its own.
//!   - Any error aborts the run; later stages never see partial input.

use crate::{
    chart,
    config::PipelineConfig,
    error::PipelineResult,
    generator::{self, FinancialRecord},
    metrics::{MetricsRecord, MetricsSummary},
    report,
    rng::SeededRng,
    store::WarehouseStore,
};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Store,
    Query,
    Chart,
    Export,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Store => "store",
            Self::Query => "query",
            Self::Chart => "chart",
            Self::Export => "export",
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub raw_csv: PathBuf,
    pub warehouse: PathBuf,
    pub charts: Vec<PathBuf>,
    pub workbook: PathBuf,
    pub summary: MetricsSummary,
}

impl PipelineOutcome {
    /// Every file the run wrote, in stage order.
    pub fn artifacts(&self) -> Vec<&PathBuf> {
        let mut all = vec![&self.raw_csv, &self.warehouse];
        all.extend(self.charts.iter());
        all.push(&self.workbook);
        all
    }
}

pub struct Pipeline {
    pub config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run all stages top to bottom.
    pub fn run(&self) -> PipelineResult<PipelineOutcome> {
        let base = self.generate()?;
        self.store(&base)?;
        let metrics = self.query()?;

        let summary = MetricsSummary::from_records(&metrics);
        log::info!(
            "Summary: {} months, revenue {:.2}, profit {:.2}, mean margin {:.2}%",
            summary.months,
            summary.total_revenue,
            summary.total_profit,
            summary.mean_profit_margin
        );

        let charts = self.chart(&metrics)?;
        let workbook = self.export(&metrics)?;

        Ok(PipelineOutcome {
            raw_csv: self.config.raw_csv_path(),
            warehouse: self.config.warehouse_path(),
            charts,
            workbook,
            summary,
        })
    }

    /// Stage 1: build the base table and write the raw CSV.
    pub fn generate(&self) -> PipelineResult<Vec<FinancialRecord>> {
        log::info!("[{}] seed={}", Stage::Generate.name(), self.config.generator.seed);
        let mut rng = SeededRng::new(self.config.generator.seed).with_name(Stage::Generate.name());
        let records = generator::generate(&self.config.generator, &mut rng)?;

        let csv_path = self.config.raw_csv_path();
        generator::write_raw_csv(&csv_path, &records)?;
        log::info!("[{}] {} rows -> {}", Stage::Generate.name(), records.len(), csv_path.display());
        Ok(records)
    }

    /// Stage 2: replace the warehouse table with `records`.
    pub fn store(&self, records: &[FinancialRecord]) -> PipelineResult<()> {
        let path = self.config.warehouse_path();
        let table = &self.config.warehouse.table;
        let mut store = WarehouseStore::open(&path)?;
        store.replace_table(table, records)?;
        log::info!(
            "[{}] {} rows -> {}:{table}",
            Stage::Store.name(),
            store.row_count(table)?,
            path.display()
        );
        Ok(())
    }

    /// Stage 3: read back the table with derived columns.
    pub fn query(&self) -> PipelineResult<Vec<MetricsRecord>> {
        let store = WarehouseStore::open(self.config.warehouse_path())?;
        let metrics = store.query_metrics(&self.config.warehouse.table)?;
        log::info!("[{}] {} rows", Stage::Query.name(), metrics.len());
        Ok(metrics)
    }

    /// Stage 4: render the four charts.
    pub fn chart(&self, metrics: &[MetricsRecord]) -> PipelineResult<Vec<PathBuf>> {
        let charts = chart::render_all(metrics, &self.config.charts, &self.config.output_dir)?;
        log::info!("[{}] {} charts written", Stage::Chart.name(), charts.len());
        Ok(charts)
    }

    /// Stage 5: write the rounded metrics workbook.
    pub fn export(&self, metrics: &[MetricsRecord]) -> PipelineResult<PathBuf> {
        let path = self.config.workbook_path();
        report::export_workbook(&path, &self.config.report.sheet_name, metrics)?;
        log::info!("[{}] workbook -> {}", Stage::Export.name(), path.display());
        Ok(path)
    }
}
