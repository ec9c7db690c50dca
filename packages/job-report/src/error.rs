//! Typed errors for report generation.

use thiserror::Error;

/// Errors that abort a report run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Required AAP call failed (job listing)
    #[error("AAP request failed: {0}")]
    Remote(#[from] aap_client::AapError),

    /// Job has neither `finished` nor `started`, or the value has no `T` separator
    #[error("job {job_id} has a malformed timestamp: {value:?}")]
    MalformedTimestamp { job_id: i64, value: String },

    /// Report file could not be created or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row serialization or CSV write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing or invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    /// Configuration file is not valid YAML
    #[error("config YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("batch size must be at least 1")]
    InvalidBatchSize,
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
