//! Feature Transformation Error Types

use thiserror::Error;

/// Errors during feature transformation
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A record lacks a column the feature configuration requires
    #[error("Schema error: record {row} is missing required column '{column}'")]
    MissingColumn { row: usize, column: String },

    /// A binary or numerical column holds a value that is not a number
    #[error("Schema error: column '{column}' in record {row} holds non-numeric value {value:?}")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// Feature configuration is inconsistent
    #[error("Invalid feature configuration: {0}")]
    InvalidConfig(String),

    /// Persisted fitted parameters do not cover the configured columns
    #[error("Fitted parameters mismatch: {0}")]
    FittedParams(String),

    /// Matrix values and column names disagree
    #[error("Feature matrix shape mismatch: {columns} column names for {width} columns")]
    ShapeMismatch { columns: usize, width: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeatureError {
    /// Whether the error is an input-contract violation of the batch itself.
    ///
    /// Schema errors abort only the offending batch; every other variant
    /// points at configuration or deployment problems.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FeatureError::MissingColumn { .. } | FeatureError::NonNumeric { .. }
        )
    }
}
