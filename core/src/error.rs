use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Sheet '{name}' not found in workbook")]
    SheetNotFound { name: String },

    #[error("Sheet has no header row")]
    EmptySheet,

    #[error("Required column '{column}' not found")]
    MissingColumn { column: String },

    #[error("Invalid date in row {row}: '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
