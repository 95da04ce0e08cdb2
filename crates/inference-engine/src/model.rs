//! Model types and the prediction interface shared by all artifacts

use crate::forest::ForestModel;
use crate::linear::{LinearKind, LinearModel};
use crate::onnx::OnnxModel;
use crate::InferenceError;
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Closed set of supported artifact types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Random forest serialized as JSON trees
    RandomForest,
    /// Logistic regression serialized as JSON coefficients
    LogisticRegression,
    /// Linear support vector classifier serialized as JSON coefficients
    LinearSvc,
    /// ONNX graph executed with tract
    Onnx,
}

impl ModelType {
    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::RandomForest => "random_forest",
            ModelType::LogisticRegression => "logistic_regression",
            ModelType::LinearSvc => "linear_svc",
            ModelType::Onnx => "onnx",
        }
    }

    /// Whether models of this type can estimate class probabilities
    pub fn supports_proba(&self) -> bool {
        !matches!(self, ModelType::LinearSvc)
    }

    /// Whether models of this type have a rule for NaN features
    pub fn accepts_missing(&self) -> bool {
        matches!(self, ModelType::RandomForest)
    }

    /// Load an artifact of this type from `path`
    pub fn load(&self, path: &Path) -> Result<Box<dyn Model>, InferenceError> {
        Ok(match self {
            ModelType::RandomForest => Box::new(ForestModel::load(path)?),
            ModelType::LogisticRegression => {
                Box::new(LinearModel::load(path, LinearKind::LogisticRegression)?)
            }
            ModelType::LinearSvc => Box::new(LinearModel::load(path, LinearKind::LinearSvc)?),
            ModelType::Onnx => Box::new(OnnxModel::load(path)?),
        })
    }

    /// Error for an artifact of this type that could not be loaded
    pub(crate) fn load_error(&self, path: &Path, reason: impl fmt::Display) -> InferenceError {
        InferenceError::ArtifactLoad {
            path: path.display().to_string(),
            model_type: self.as_str(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ModelType {
    type Err = InferenceError;

    /// Identifiers match case-insensitively; spaces and hyphens count as underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "random_forest" | "random_forest_classifier" => Ok(ModelType::RandomForest),
            "logistic_regression" => Ok(ModelType::LogisticRegression),
            "linear_svc" | "linear_svm" => Ok(ModelType::LinearSvc),
            "onnx" => Ok(ModelType::Onnx),
            _ => Err(InferenceError::UnknownModelType(s.to_string())),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loaded, immutable classification model.
///
/// Implementations check the matrix width and reject values they cannot
/// score, so a mismatched matrix is an error rather than a panic.
pub trait Model: Send + Sync + fmt::Debug {
    fn model_type(&self) -> ModelType;

    /// Feature count the artifact expects, when it declares one
    fn n_features(&self) -> Option<usize>;

    /// Number of classes the artifact predicts, when it declares one
    fn n_classes(&self) -> Option<usize>;

    /// Raw class index per row
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError>;

    /// Class probabilities, one row per input row
    fn predict_proba(&self, _features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        Err(InferenceError::UnsupportedOperation {
            model_type: self.model_type().as_str(),
            operation: "predict_proba",
        })
    }
}

/// Reject a matrix of the wrong width, or holding non-finite values when
/// `model_type` has no rule for them
pub(crate) fn check_input(
    model_type: ModelType,
    n_features: Option<usize>,
    features: ArrayView2<'_, f64>,
) -> Result<(), InferenceError> {
    if let Some(expected) = n_features {
        if expected != features.ncols() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} feature columns", expected),
                actual: format!("{} feature columns", features.ncols()),
            });
        }
    }

    if !model_type.accepts_missing() {
        if let Some(((row, column), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(InferenceError::NonFiniteFeature {
                model_type: model_type.as_str(),
                row,
                column,
            });
        }
    }

    Ok(())
}

/// Index of the first maximum; NaN never wins
pub(crate) fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &value) in row.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

/// Row-wise argmax over a score matrix
pub(crate) fn argmax_rows(scores: &Array2<f64>) -> Vec<usize> {
    scores.rows().into_iter().map(argmax).collect()
}
