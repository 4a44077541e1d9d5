//! Error types for the composable-diversity library.

use thiserror::Error;

/// Main error type for the library.
///
/// Diversity and rarefaction requested for a non-organism annotation are not
/// errors; see [`crate::data::Applicability`].
#[derive(Error, Debug)]
pub enum DivError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed abundance matrix: {0}")]
    Format(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown sample '{0}'")]
    NotFound(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DivError>;
