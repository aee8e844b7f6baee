// crates/salesflow-core/src/error.rs

use polars::prelude::DataType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Object storage error: {0}")]
    Bucket(#[from] salesflow_bucket::BucketError),

    #[error("Table write failed: {0}")]
    Table(#[from] salesflow_table::TableError),

    #[error("Notification failed: {0}")]
    Topic(#[from] salesflow_topic::TopicError),

    #[error("File I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column `{0}` is missing")]
    MissingColumn(String),

    #[error("Column `{column}` must be numeric; found {dtype}")]
    NonNumericColumn { column: String, dtype: DataType },

    #[error("Row {line} is invalid: {message}")]
    InvalidRow { line: u64, message: String },
}

impl PipelineError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
