use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data quality error: {0}")]
    DataQuality(String),

    #[error("Join error: {0}")]
    Join(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// True for the failures a caller can fix by correcting input data,
    /// as opposed to configuration or environment problems.
    pub fn is_data_error(&self) -> bool {
        matches!(self, PipelineError::DataQuality(_) | PipelineError::Join(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
