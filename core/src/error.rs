use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Chart '{chart}' failed: {message}")]
    Chart { chart: String, message: String },

    #[error("Invalid distribution parameters: {0}")]
    Distribution(String),

    #[error("Invalid table name '{0}': expected a plain SQL identifier")]
    InvalidTableName(String),

    #[error("Unrecognised month value '{0}'")]
    MonthParse(String),
}

impl PipelineError {
    /// Attach the offending path to an I/O error.
    /// Usage: `fs::create_dir_all(&dir).map_err(PipelineError::io(&dir))?`
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
