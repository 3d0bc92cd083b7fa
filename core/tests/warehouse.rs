//! Warehouse writer and metrics query tests.

use chrono::NaiveDate;
use finreport_core::{
    config::GeneratorConfig,
    error::PipelineError,
    generator::{generate, FinancialRecord},
    rng::SeededRng,
    store::WarehouseStore,
};

const TABLE: &str = "financials";

fn default_table() -> Vec<FinancialRecord> {
    let config = GeneratorConfig::default();
    let mut rng = SeededRng::new(config.seed);
    generate(&config, &mut rng).expect("generate")
}

fn store_with(records: &[FinancialRecord]) -> WarehouseStore {
    let mut store = WarehouseStore::in_memory().expect("in-memory store");
    store.replace_table(TABLE, records).expect("replace table");
    store
}

#[test]
fn round_trip_preserves_base_columns() {
    let table = default_table();
    let store = store_with(&table);

    assert_eq!(store.load_table(TABLE).unwrap(), table);

    let metrics = store.query_metrics(TABLE).unwrap();
    assert_eq!(metrics.len(), 24);
    for (m, base) in metrics.iter().zip(&table) {
        assert_eq!(m.month, base.month);
        assert_eq!(m.revenue, base.revenue);
        assert_eq!(m.expenses, base.expenses);
        assert_eq!(m.sales_volume, base.sales_volume);
    }
}

#[test]
fn derived_columns_match_their_formulas() {
    let store = store_with(&default_table());

    for m in store.query_metrics(TABLE).unwrap() {
        let profit = m.revenue - m.expenses;
        assert!((m.profit - profit).abs() < 0.01, "profit mismatch for {}", m.month);
        assert!(
            (m.profit_margin - profit / m.revenue * 100.0).abs() < 0.01,
            "margin mismatch for {}",
            m.month
        );
        assert!(
            (m.revenue_per_unit - m.revenue / m.sales_volume as f64).abs() < 0.01,
            "revenue per unit mismatch for {}",
            m.month
        );
    }
}

#[test]
fn metrics_are_ordered_by_month_even_if_inserted_out_of_order() {
    let mut table = default_table();
    table.reverse();
    let store = store_with(&table);

    let metrics = store.query_metrics(TABLE).unwrap();
    assert_eq!(metrics[0].month, NaiveDate::from_ymd_opt(2022, 1, 31).unwrap());
    assert!(metrics.windows(2).all(|w| w[0].month < w[1].month));
}

#[test]
fn writing_twice_replaces_rather_than_appends() {
    let table = default_table();
    let mut store = store_with(&table);
    store.replace_table(TABLE, &table).unwrap();

    assert_eq!(store.row_count(TABLE).unwrap(), 24);
    assert_eq!(store.table_names().unwrap(), vec![TABLE.to_string()]);
}

#[test]
fn replace_discards_rows_from_a_larger_prior_table() {
    let table = default_table();
    let mut store = store_with(&table);
    store.replace_table(TABLE, &table[..10]).unwrap();

    assert_eq!(store.row_count(TABLE).unwrap(), 10);
}

#[test]
fn base_table_holds_no_derived_columns() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("financial_warehouse.db");
    {
        let mut store = WarehouseStore::open(&path).unwrap();
        store.replace_table(TABLE, &default_table()).unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('financials')").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, ["month", "revenue", "expenses", "sales_volume"]);
}

#[test]
fn zero_revenue_and_volume_yield_nan_instead_of_failing() {
    let record = FinancialRecord {
        month: NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(),
        revenue: 0.0,
        expenses: 100.0,
        sales_volume: 0,
    };
    let store = store_with(&[record]);

    let metrics = store.query_metrics(TABLE).unwrap();
    assert_eq!(metrics[0].profit, -100.0);
    assert!(metrics[0].profit_margin.is_nan());
    assert!(metrics[0].revenue_per_unit.is_nan());
}

#[test]
fn querying_a_missing_table_is_a_database_error() {
    let store = WarehouseStore::in_memory().unwrap();
    let err = store.query_metrics(TABLE).unwrap_err();
    assert!(matches!(err, PipelineError::Database(_)), "got {err:?}");
}

#[test]
fn unsafe_table_names_are_refused() {
    let mut store = WarehouseStore::in_memory().unwrap();
    let err = store
        .replace_table("financials; DROP TABLE x", &default_table())
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTableName(_)));
}
