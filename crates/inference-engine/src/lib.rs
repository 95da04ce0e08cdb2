//! Genre Classifier
//!
//! Loads a pre-trained model artifact and predicts label indices, label names
//! or class probabilities from a feature matrix.

mod classifier;
mod config;
mod forest;
mod linear;
mod model;
mod onnx;

pub use classifier::{Classifier, Predictions};
pub use config::ModelConfig;
pub use forest::{ForestModel, Node, Tree};
pub use linear::{LinearKind, LinearModel};
pub use model::{Model, ModelType};
pub use onnx::OnnxModel;

use thiserror::Error;

/// Errors during artifact loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Unknown model type: '{0}'")]
    UnknownModelType(String),
    #[error("Failed to load {model_type} artifact from {path}: {reason}")]
    ArtifactLoad {
        path: String,
        model_type: &'static str,
        reason: String,
    },
    #[error("Predicted class index {index} has no label ({labels} labels configured)")]
    IndexMapping { index: usize, labels: usize },
    #[error("{model_type} models do not support {operation}")]
    UnsupportedOperation {
        model_type: &'static str,
        operation: &'static str,
    },
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("{model_type} models cannot score non-finite feature at row {row}, column {column}")]
    NonFiniteFeature {
        model_type: &'static str,
        row: usize,
        column: usize,
    },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
