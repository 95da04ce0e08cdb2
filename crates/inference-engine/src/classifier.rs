//! Classifier Implementation

use crate::config::ModelConfig;
use crate::model::{Model, ModelType};
use crate::InferenceError;
use feature_engine::FeatureMatrix;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Output of [`Classifier::predict`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predictions {
    /// Raw class index per row
    Indices(Vec<usize>),
    /// Label name per row
    Labels(Vec<String>),
}

impl Predictions {
    pub fn len(&self) -> usize {
        match self {
            Predictions::Indices(v) => v.len(),
            Predictions::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loaded model plus its label mapping.
///
/// A `Classifier` only exists once its artifact has loaded successfully, and
/// it is never mutated afterwards.
#[derive(Debug)]
pub struct Classifier {
    model: Box<dyn Model>,
    /// Label for each raw class index
    labels: Vec<String>,
    model_path: Option<PathBuf>,
}

impl Classifier {
    /// Load the artifact described by the `model` configuration section
    pub fn load(config: &ModelConfig) -> Result<Self, InferenceError> {
        let model_type: ModelType = config.model_type.parse()?;
        info!(
            "Loading {} classifier from {} with {} labels",
            model_type,
            config.path.display(),
            config.labels.len()
        );

        let model = model_type.load(&config.path)?;
        let mut classifier = Self::from_model(model, config.labels.clone());
        classifier.model_path = Some(config.path.clone());
        Ok(classifier)
    }

    /// Wrap an already loaded model
    pub fn from_model(model: Box<dyn Model>, labels: Vec<String>) -> Self {
        if let Some(n_classes) = model.n_classes() {
            if n_classes != labels.len() {
                warn!(
                    "{} model predicts {} classes but {} labels are configured",
                    model.model_type(),
                    n_classes,
                    labels.len()
                );
            }
        }

        Self {
            model,
            labels,
            model_path: None,
        }
    }

    /// Predict one class per row, as raw indices or as label names
    pub fn predict(
        &self,
        features: &FeatureMatrix,
        return_labels: bool,
    ) -> Result<Predictions, InferenceError> {
        if return_labels {
            self.predict_labels(features).map(Predictions::Labels)
        } else {
            self.predict_indices(features).map(Predictions::Indices)
        }
    }

    /// Raw class index per row.
    ///
    /// Fails on a matrix of the wrong width, and on NaN features unless the
    /// model type defines a rule for them.
    pub fn predict_indices(&self, features: &FeatureMatrix) -> Result<Vec<usize>, InferenceError> {
        let start = std::time::Instant::now();

        let indices = self.model.predict(features.view())?;

        debug!(
            "Predicted {} rows in {}us",
            indices.len(),
            start.elapsed().as_micros()
        );
        Ok(indices)
    }

    /// Label name per row; fails if an index has no configured label
    pub fn predict_labels(&self, features: &FeatureMatrix) -> Result<Vec<String>, InferenceError> {
        self.predict_indices(features)?
            .into_iter()
            .map(|index| self.label(index).map(str::to_string))
            .collect()
    }

    /// Class probabilities, one row per input row
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Array2<f64>, InferenceError> {
        if !self.model.model_type().supports_proba() {
            return Err(InferenceError::UnsupportedOperation {
                model_type: self.model.model_type().as_str(),
                operation: "predict_proba",
            });
        }
        self.model.predict_proba(features.view())
    }

    /// Label for a raw class index
    pub fn label(&self, index: usize) -> Result<&str, InferenceError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(InferenceError::IndexMapping {
                index,
                labels: self.labels.len(),
            })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    /// Artifact path, when loaded from configuration
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestModel, Node, Tree};
    use crate::linear::{LinearKind, LinearModel};
    use ndarray::{array, ArrayView2};
    use std::fs;

    /// Returns fixed raw predictions regardless of input
    #[derive(Debug)]
    struct FixedModel(Vec<usize>);

    impl Model for FixedModel {
        fn model_type(&self) -> ModelType {
            ModelType::RandomForest
        }

        fn n_features(&self) -> Option<usize> {
            None
        }

        fn n_classes(&self) -> Option<usize> {
            None
        }

        fn predict(&self, _features: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn matrix(rows: usize) -> FeatureMatrix {
        FeatureMatrix::from_array(Array2::zeros((rows, 2)))
    }

    #[test]
    fn test_predict_labels() {
        let classifier =
            Classifier::from_model(Box::new(FixedModel(vec![0, 1, 0])), labels(&["rock", "pop"]));

        let preds = classifier.predict(&matrix(3), true).unwrap();
        assert_eq!(preds.len(), 3);
        assert!(!preds.is_empty());
        assert_eq!(preds, Predictions::Labels(labels(&["rock", "pop", "rock"])));

        let preds = classifier.predict(&matrix(3), false).unwrap();
        assert_eq!(preds, Predictions::Indices(vec![0, 1, 0]));
    }

    #[test]
    fn test_index_without_label_fails() {
        let classifier =
            Classifier::from_model(Box::new(FixedModel(vec![0, 2])), labels(&["rock", "pop"]));

        let err = classifier.predict(&matrix(2), true).unwrap_err();
        assert!(matches!(err, InferenceError::IndexMapping { index: 2, labels: 2 }));

        // Raw indices remain available
        assert_eq!(classifier.predict_indices(&matrix(2)).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let model = LinearModel::new(LinearKind::LogisticRegression, vec![vec![1.0, 1.0, 1.0]], vec![0.0])
            .unwrap();
        let classifier = Classifier::from_model(Box::new(model), labels(&["rock", "pop"]));

        assert!(matches!(
            classifier.predict(&matrix(1), false),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_empty_predictions() {
        let classifier = Classifier::from_model(Box::new(FixedModel(vec![])), labels(&["rock"]));
        assert!(classifier.predict(&matrix(0), false).unwrap().is_empty());
    }

    #[test]
    fn test_nan_rejected_by_linear_model() {
        let model =
            LinearModel::new(LinearKind::LogisticRegression, vec![vec![1.0, -1.0]], vec![0.0])
                .unwrap();
        let classifier = Classifier::from_model(Box::new(model), labels(&["rock", "pop"]));
        let features = FeatureMatrix::from_array(array![[0.5, 0.0], [f64::NAN, 0.0]]);

        assert!(matches!(
            classifier.predict_labels(&features),
            Err(InferenceError::NonFiniteFeature { row: 1, column: 0, .. })
        ));
        assert!(matches!(
            classifier.predict_proba(&features),
            Err(InferenceError::NonFiniteFeature { row: 1, .. })
        ));
    }

    #[test]
    fn test_nan_goes_right_in_forest() {
        let forest = ForestModel::new(
            1,
            2,
            vec![Tree {
                nodes: vec![
                    Node::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 1,
                        right: 2,
                    },
                    Node::Leaf { value: vec![1.0, 0.0] },
                    Node::Leaf { value: vec![0.0, 1.0] },
                ],
            }],
        )
        .unwrap();
        let classifier = Classifier::from_model(Box::new(forest), labels(&["rock", "pop"]));
        let features = FeatureMatrix::from_array(array![[f64::NAN]]);

        assert_eq!(classifier.predict_labels(&features).unwrap(), labels(&["pop"]));
    }

    #[test]
    fn test_proba_unsupported_for_svc() {
        let model = LinearModel::new(LinearKind::LinearSvc, vec![vec![1.0, -1.0]], vec![0.0]).unwrap();
        let classifier = Classifier::from_model(Box::new(model), labels(&["rock", "pop"]));

        assert!(matches!(
            classifier.predict_proba(&matrix(1)),
            Err(InferenceError::UnsupportedOperation { model_type: "linear_svc", .. })
        ));
        assert_eq!(classifier.predict_labels(&matrix(1)).unwrap(), labels(&["rock"]));
    }

    #[test]
    fn test_proba_rows_sum_to_one() {
        let forest = ForestModel::new(
            2,
            2,
            vec![Tree {
                nodes: vec![
                    Node::Split {
                        feature: 1,
                        threshold: 0.0,
                        left: 1,
                        right: 2,
                    },
                    Node::Leaf { value: vec![1.0, 3.0] },
                    Node::Leaf { value: vec![5.0, 5.0] },
                ],
            }],
        )
        .unwrap();
        let classifier = Classifier::from_model(Box::new(forest), labels(&["rock", "pop"]));

        let features = FeatureMatrix::from_array(array![[0.0, -1.0], [0.0, 1.0]]);
        let proba = classifier.predict_proba(&features).unwrap();
        assert_eq!(proba, array![[0.25, 0.75], [0.5, 0.5]]);
        assert_eq!(classifier.predict_labels(&features).unwrap(), labels(&["pop", "rock"]));
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear.json");
        fs::write(&path, r#"{"coefficients": [[2.0, 0.0]], "intercepts": [-1.0]}"#).unwrap();

        let config = ModelConfig {
            path: path.clone(),
            model_type: "logistic regression".to_string(),
            labels: labels(&["rock", "pop"]),
        };
        let classifier = Classifier::load(&config).unwrap();

        assert_eq!(classifier.model_type(), ModelType::LogisticRegression);
        assert_eq!(classifier.model_path(), Some(path.as_path()));
        let features = FeatureMatrix::from_array(array![[0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(classifier.predict_labels(&features).unwrap(), labels(&["rock", "pop"]));
    }

    #[test]
    fn test_load_unknown_type() {
        let config = ModelConfig {
            path: PathBuf::from("model.bin"),
            model_type: "naive bayes".to_string(),
            labels: labels(&["rock"]),
        };
        assert!(matches!(
            Classifier::load(&config),
            Err(InferenceError::UnknownModelType(_))
        ));
    }

    #[test]
    fn test_load_unreadable_artifact() {
        let config = ModelConfig {
            path: PathBuf::from("/nonexistent/forest.json"),
            model_type: "random forest classifier".to_string(),
            labels: labels(&["rock"]),
        };
        assert!(matches!(
            Classifier::load(&config),
            Err(InferenceError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_classifier_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Classifier>();
    }
}
