//! Monthly financial reporting pipeline: synthetic data, SQLite warehouse,
//! derived metrics, PNG charts and a spreadsheet report.

pub mod chart;
pub mod config;
pub mod error;
pub mod generator;
pub mod histogram;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod rng;
pub mod store;
pub mod types;
