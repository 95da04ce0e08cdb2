//! Model configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `model` section of the pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized artifact
    pub path: PathBuf,
    /// Model type identifier, e.g. `random_forest` or `onnx`
    #[serde(rename = "type")]
    pub model_type: String,
    /// Label name for each raw class index, in index order
    pub labels: Vec<String>,
}
