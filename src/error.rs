use crate::types::stage::Stage;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Required column '{column}' not found during {stage}")]
    MissingColumn { stage: Stage, column: String },

    // Only raised if polars rejects a selection of the frame's own column
    // names, which a well-formed DataFrame never triggers
    #[error("Input is not well-formed tabular data during {stage}")]
    ProjectionFailed {
        stage: Stage,
        #[source]
        source: PolarsError,
    },

    // A present date code must be exactly 8 ASCII digits (YYYYMMDD)
    #[error("Malformed date code '{value}' in column '{column}' at row {row} during {stage}, expected YYYYMMDD")]
    MalformedDateCode {
        stage: Stage,
        column: String,
        row: usize,
        value: String,
    },

    #[error("Polars operation failed during {stage}")]
    Polars {
        stage: Stage,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to write CSV file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to write parquet file '{0}'")]
    ParquetWrite(PathBuf, #[source] PolarsError),

    #[error("I/O error on output file '{0}'")]
    OutputIo(PathBuf, #[source] std::io::Error),

    #[error("Failed to read input directory '{0}'")]
    InputDirRead(PathBuf, #[source] std::io::Error),

    #[error("Could not find input tables in '{dir}': {message}")]
    InputDiscovery { dir: PathBuf, message: String },

    #[error("Failed to read config file '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}

/// Attaches the pipeline [`Stage`] to a polars failure.
pub(crate) trait StageContext<T> {
    fn in_stage(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> StageContext<T> for Result<T, PolarsError> {
    fn in_stage(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError::Polars { stage, source })
    }
}
