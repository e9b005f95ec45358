use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Too many unparseable lines: {error_percent:.2}% of the log failed to parse (limit {limit}%)"
    )]
    ParseBudgetExceeded { error_percent: f64, limit: f64 },

    #[error("Log file contains no lines")]
    EmptyInput,

    #[error("No log file found: {0}")]
    SourceNotFound(String),

    #[error("Report directory does not exist: {}", .0.display())]
    ReportDirNotFound(PathBuf),

    #[error("Invalid config file: {0}")]
    ConfigFileInvalid(String),

    #[error("Invalid report template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, Error>;
