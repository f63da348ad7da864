//! Error taxonomy shared by every pipeline step.

use thiserror::Error;

/// Errors surfaced by the ETL pipeline. None of them are caught or retried;
/// they propagate to the process entry point and abort the run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Configuration error: missing required environment variable(s): {}", .0.join(", "))]
    Configuration(Vec<String>),

    #[error("Object store rejected credentials while reading '{key}': {message}")]
    Credentials { key: String, message: String },

    #[error("Object '{key}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    #[error("Column '{0}' not in table")]
    MissingColumn(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Duplicate entry for week '{week}' and player '{player}'")]
    DuplicateEntry { week: String, player: String },

    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Object store error reading '{key}': {message}")]
    ObjectStore { key: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
