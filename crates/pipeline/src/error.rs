//! Pipeline Error Types

use feature_engine::FeatureError;
use inference_engine::InferenceError;
use thiserror::Error;

/// Errors while building or running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
