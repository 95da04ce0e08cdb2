//! ONNX artifact executed with tract

use crate::model::{argmax_rows, check_input, Model, ModelType};
use crate::InferenceError;
use ndarray::{Array2, ArrayView2};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// ONNX classifier.
///
/// The first rank-2 `f32` output of the graph is read as the class
/// probability matrix (for scikit-learn exports, convert with
/// `zipmap=False`).
pub struct OnnxModel {
    plan: TypedRunnableModel<TypedModel>,
    path: PathBuf,
}

impl fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxModel").field("path", &self.path).finish()
    }
}

impl OnnxModel {
    /// Load and optimize an ONNX graph
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        if !path.is_file() {
            return Err(ModelType::Onnx.load_error(path, "file not found"));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelType::Onnx.load_error(path, e))?;

        info!("Loaded ONNX model from {}", path.display());
        Ok(Self {
            plan,
            path: path.to_path_buf(),
        })
    }

    fn scores(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        check_input(ModelType::Onnx, None, features)?;
        let (rows, cols) = features.dim();
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[rows, cols], &data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let scores = outputs
            .iter()
            .find(|t| t.datum_type() == f32::datum_type() && t.rank() == 2)
            .ok_or_else(|| {
                InferenceError::InferenceFailed("model has no rank-2 f32 output".to_string())
            })?;

        let shape = scores.shape();
        if shape[0] != rows {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} output rows", rows),
                actual: format!("{} output rows", shape[0]),
            });
        }
        debug!("ONNX inference produced {}x{} scores", shape[0], shape[1]);

        let values = scores
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .iter()
            .map(|&v| v as f64)
            .collect();
        Array2::from_shape_vec((shape[0], shape[1]), values)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
    }
}

impl Model for OnnxModel {
    fn model_type(&self) -> ModelType {
        ModelType::Onnx
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn n_classes(&self) -> Option<usize> {
        None
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError> {
        if features.nrows() == 0 {
            return Ok(Vec::new());
        }
        Ok(argmax_rows(&self.scores(features)?))
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if features.nrows() == 0 {
            return Ok(Array2::zeros((0, 0)));
        }

        let mut proba = self.scores(features)?;
        for mut row in proba.rows_mut() {
            if row.iter().any(|&p| p < 0.0 || !p.is_finite()) {
                return Err(InferenceError::InferenceFailed(
                    "ONNX output is not a probability matrix".to_string(),
                ));
            }
            let sum = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|p| p / sum);
            }
        }
        Ok(proba)
    }
}
