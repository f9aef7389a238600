use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures raised by the artifact loaders and the inference layer.
///
/// Loaders wrap these in `anyhow` context; callers that need to branch on the
/// kind recover it with `err.downcast_ref::<DashboardError>()`.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("parse error: {0}")]
    Parse(String),

    /// A row that parsed but violates the passenger schema.
    #[error("row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("cannot deserialize model: {0}")]
    Deserialization(String),

    #[error("feature schema mismatch (missing: {missing:?}, unexpected: {unexpected:?})")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// The estimator could not be fitted to the training table.
    #[error("training failed: {0}")]
    Training(String),

    #[error("model kind '{0}' does not expose linear coefficients")]
    UnsupportedModelType(String),

    #[error("{field} = {value} is outside {range}")]
    InputOutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
