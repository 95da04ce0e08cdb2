//! Linear model artifacts: logistic regression and linear SVC

use crate::model::{argmax_rows, check_input, Model, ModelType};
use crate::InferenceError;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Which decision rule the coefficients belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearKind {
    /// Probabilities through sigmoid (binary) or softmax
    LogisticRegression,
    /// Decision values only, no probabilities
    LinearSvc,
}

impl LinearKind {
    fn model_type(&self) -> ModelType {
        match self {
            LinearKind::LogisticRegression => ModelType::LogisticRegression,
            LinearKind::LinearSvc => ModelType::LinearSvc,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// Linear classifier `X · Wᵀ + b`.
///
/// A single coefficient row is a binary model whose positive decision
/// predicts class 1.
#[derive(Debug, Clone)]
pub struct LinearModel {
    kind: LinearKind,
    /// k × m
    coefficients: Array2<f64>,
    /// k
    intercepts: Array1<f64>,
}

impl LinearModel {
    /// Load a JSON coefficient artifact
    pub fn load(path: &Path, kind: LinearKind) -> Result<Self, InferenceError> {
        let model_type = kind.model_type();
        let text = fs::read_to_string(path).map_err(|e| model_type.load_error(path, e))?;
        let artifact: LinearArtifact =
            serde_json::from_str(&text).map_err(|e| model_type.load_error(path, e))?;
        let model = Self::new(kind, artifact.coefficients, artifact.intercepts)
            .map_err(|reason| model_type.load_error(path, reason))?;

        info!(
            "Loaded {} from {}: {} features, {} classes",
            model_type,
            path.display(),
            model.coefficients.ncols(),
            model.class_count()
        );
        Ok(model)
    }

    pub fn new(
        kind: LinearKind,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, String> {
        let rows = coefficients.len();
        if rows == 0 {
            return Err("no coefficient rows".to_string());
        }
        if intercepts.len() != rows {
            return Err(format!(
                "{} intercepts for {} coefficient rows",
                intercepts.len(),
                rows
            ));
        }
        let width = coefficients[0].len();
        if coefficients.iter().any(|row| row.len() != width) {
            return Err("coefficient rows differ in width".to_string());
        }

        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        if flat.iter().chain(&intercepts).any(|v| !v.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }
        let coefficients =
            Array2::from_shape_vec((rows, width), flat).map_err(|e| e.to_string())?;

        Ok(Self {
            kind,
            coefficients,
            intercepts: Array1::from(intercepts),
        })
    }

    fn is_binary(&self) -> bool {
        self.coefficients.nrows() == 1
    }

    fn class_count(&self) -> usize {
        if self.is_binary() {
            2
        } else {
            self.coefficients.nrows()
        }
    }

    /// Decision values, n × k
    pub fn decision_function(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        features.dot(&self.coefficients.t()) + &self.intercepts
    }
}

impl Model for LinearModel {
    fn model_type(&self) -> ModelType {
        self.kind.model_type()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.ncols())
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.class_count())
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError> {
        check_input(self.model_type(), self.n_features(), features)?;
        let decision = self.decision_function(features);
        if self.is_binary() {
            Ok(decision.column(0).iter().map(|&d| usize::from(d > 0.0)).collect())
        } else {
            Ok(argmax_rows(&decision))
        }
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if self.kind == LinearKind::LinearSvc {
            return Err(InferenceError::UnsupportedOperation {
                model_type: self.model_type().as_str(),
                operation: "predict_proba",
            });
        }
        check_input(self.model_type(), self.n_features(), features)?;

        let decision = self.decision_function(features);
        if self.is_binary() {
            let mut proba = Array2::zeros((decision.nrows(), 2));
            for (d, mut out) in decision.column(0).iter().zip(proba.rows_mut()) {
                let p = sigmoid(*d);
                out[0] = 1.0 - p;
                out[1] = p;
            }
            Ok(proba)
        } else {
            let mut proba = decision;
            for mut row in proba.axis_iter_mut(Axis(0)) {
                // Subtract the max for numerical stability
                let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                row.mapv_inplace(|x| (x - max).exp());
                let sum = row.sum();
                row.mapv_inplace(|x| x / sum);
            }
            Ok(proba)
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
