//! End-to-end pipeline tests. Every run writes into its own temp directory.

use finreport_core::{
    chart,
    config::PipelineConfig,
    pipeline::Pipeline,
    store::WarehouseStore,
};
use tempfile::TempDir;

fn run_in(dir: &TempDir) -> finreport_core::pipeline::PipelineOutcome {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = PipelineConfig::default().with_output_dir(dir.path());
    Pipeline::new(config).run().expect("pipeline run")
}

#[test]
fn full_run_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let outcome = run_in(&dir);

    let expected = [
        "data/financial_data.csv",
        "financial_warehouse.db",
        chart::REVENUE_VS_EXPENSES,
        chart::PROFIT_MARGIN_TREND,
        chart::REVENUE_PER_UNIT_HISTOGRAM,
        chart::PROFIT_BY_MONTH,
        "financial_report.xlsx",
    ];
    for name in expected {
        let path = dir.path().join(name);
        let size = std::fs::metadata(&path)
            .unwrap_or_else(|e| panic!("{} missing: {e}", path.display()))
            .len();
        assert!(size > 0, "{} is empty", path.display());
    }
    assert_eq!(outcome.artifacts().len(), expected.len());
}

#[test]
fn charts_are_png_and_workbook_is_a_zip_package() {
    let dir = TempDir::new().unwrap();
    let outcome = run_in(&dir);

    for path in &outcome.charts {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{} is not a PNG", path.display());
    }
    let workbook = std::fs::read(&outcome.workbook).unwrap();
    assert_eq!(&workbook[..2], b"PK");
}

#[test]
fn warehouse_holds_one_table_of_24_rows_after_two_runs() {
    let dir = TempDir::new().unwrap();
    run_in(&dir);
    let outcome = run_in(&dir);

    let store = WarehouseStore::open(&outcome.warehouse).unwrap();
    assert_eq!(store.table_names().unwrap(), vec!["financials".to_string()]);
    assert_eq!(store.row_count("financials").unwrap(), 24);
}

#[test]
fn summary_reflects_the_queried_metrics() {
    let dir = TempDir::new().unwrap();
    let outcome = run_in(&dir);
    let summary = &outcome.summary;

    assert_eq!(summary.months, 24);
    let diff = summary.total_revenue - summary.total_expenses - summary.total_profit;
    assert!(diff.abs() < 0.01, "totals disagree by {diff}");
    let (_, best) = summary.best_month.unwrap();
    let (_, worst) = summary.worst_month.unwrap();
    assert!(best >= worst);
}

#[test]
fn stages_can_run_individually_in_order() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default().with_output_dir(dir.path()));

    let base = pipeline.generate().unwrap();
    assert_eq!(base.len(), 24, "table must be complete before storing");
    pipeline.store(&base).unwrap();
    let metrics = pipeline.query().unwrap();
    assert_eq!(metrics.len(), base.len());

    let workbook = pipeline.export(&metrics).unwrap();
    assert!(workbook.ends_with("financial_report.xlsx"));
}

#[test]
fn query_before_store_fails() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default().with_output_dir(dir.path()));
    assert!(pipeline.query().is_err());
}
