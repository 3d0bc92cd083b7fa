use crate::{
    error::{PipelineError, PipelineResult},
    types::Seed,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
    /// Draws below this are raised to it.
    pub floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoissonParams {
    pub mean: f64,
    pub floor: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: Seed,
    pub start_year: i32,
    pub start_month: u32,
    pub num_months: usize,
    pub revenue: NormalParams,
    pub expenses: NormalParams,
    pub sales_volume: PoissonParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_year: 2022,
            start_month: 1,
            num_months: 24,
            revenue: NormalParams { mean: 75_000.0, std_dev: 10_000.0, floor: 20_000.0 },
            expenses: NormalParams { mean: 45_000.0, std_dev: 8_000.0, floor: 15_000.0 },
            sales_volume: PoissonParams { mean: 500.0, floor: 100 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Database file, relative to the output directory.
    pub db_file: PathBuf,
    pub table: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_file: PathBuf::from("financial_warehouse.db"),
            table: "financials".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub histogram_bins: usize,
    /// TrueType fonts tried in order for chart text. Empty disables text.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            histogram_bins: 20,
            font_candidates: [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/Library/Fonts/Arial.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub workbook_file: PathBuf,
    pub sheet_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            workbook_file: PathBuf::from("financial_report.xlsx"),
            sheet_name: "Monthly Financial Report".to_string(),
        }
    }
}

/// Everything a run needs. `Default` is the fixed reporting layout;
/// a JSON file may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root for every artifact the run writes.
    pub output_dir: PathBuf,
    /// Raw CSV, relative to the output directory.
    pub raw_csv: PathBuf,
    pub generator: GeneratorConfig,
    pub warehouse: WarehouseConfig,
    pub charts: ChartConfig,
    pub report: ReportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            raw_csv: Path::new("data").join("financial_data.csv"),
            generator: GeneratorConfig::default(),
            warehouse: WarehouseConfig::default(),
            charts: ChartConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(PipelineError::io(path))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading pipeline config from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Same configuration rooted at a different output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(relative)
    }

    pub fn raw_csv_path(&self) -> PathBuf {
        self.resolve(&self.raw_csv)
    }

    pub fn warehouse_path(&self) -> PathBuf {
        self.resolve(&self.warehouse.db_file)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.resolve(&self.report.workbook_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.generator.seed, 42);
        assert_eq!(config.generator.num_months, 24);
        assert_eq!(config.warehouse.table, "financials");
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(config.report.sheet_name, "Monthly Financial Report");
        assert_eq!(config.raw_csv_path(), Path::new("./data/financial_data.csv"));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{ "generator": { "seed": 7 }, "charts": { "width": 640 } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.generator.seed, 7);
        assert_eq!(config.generator.num_months, 24);
        assert_eq!(config.generator.revenue.floor, 20_000.0);
        assert_eq!(config.charts.width, 640);
        assert_eq!(config.charts.height, 600);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("finreport.json");
        std::fs::write(&path, r#"{ "generator": { "seed": "forty-two" } }"#).unwrap();

        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)), "got {err:?}");
        assert!(matches!(
            PipelineConfig::load_or_default(&path),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn unreadable_file_is_an_io_error_with_its_path() {
        let err = PipelineConfig::load("definitely/not/here.json").unwrap_err();
        match err {
            PipelineError::Io { path, .. } => assert!(path.ends_with("here.json")),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = PipelineConfig::load_or_default("definitely/not/here.json").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
