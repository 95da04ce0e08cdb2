//! Random forest artifact

use crate::model::{argmax_rows, check_input, Model, ModelType};
use crate::InferenceError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Tree node as serialized in the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights at a leaf
    Leaf { value: Vec<f64> },
}

/// Decision tree, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. NaN features take the right branch.
    fn leaf(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    n_features: usize,
    n_classes: usize,
    trees: Vec<Tree>,
}

/// Random forest classifier: probabilities are the mean of the per-tree
/// leaf class distributions
#[derive(Debug, Clone)]
pub struct ForestModel {
    n_features: usize,
    n_classes: usize,
    /// Leaf weights already normalized to distributions
    trees: Vec<Tree>,
}

impl ForestModel {
    /// Load a JSON forest artifact
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let model_type = ModelType::RandomForest;
        let text = fs::read_to_string(path).map_err(|e| model_type.load_error(path, e))?;
        let artifact: ForestArtifact =
            serde_json::from_str(&text).map_err(|e| model_type.load_error(path, e))?;
        let model = Self::new(artifact.n_features, artifact.n_classes, artifact.trees)
            .map_err(|reason| model_type.load_error(path, reason))?;

        info!(
            "Loaded random forest from {}: {} trees, {} features, {} classes",
            path.display(),
            model.trees.len(),
            model.n_features,
            model.n_classes
        );
        Ok(model)
    }

    /// Validate trees and normalize their leaves
    pub fn new(n_features: usize, n_classes: usize, mut trees: Vec<Tree>) -> Result<Self, String> {
        if n_classes == 0 {
            return Err("forest declares zero classes".to_string());
        }
        if trees.is_empty() {
            return Err("forest has no trees".to_string());
        }

        for (t, tree) in trees.iter_mut().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            let len = tree.nodes.len();
            for (idx, node) in tree.nodes.iter_mut().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= n_features {
                            return Err(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, idx, feature, n_features
                            ));
                        }
                        if threshold.is_nan() {
                            return Err(format!("tree {} node {} has a NaN threshold", t, idx));
                        }
                        // Children after parents guarantees the walk terminates
                        for child in [*left, *right] {
                            if child <= idx || child >= len {
                                return Err(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, idx, child
                                ));
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != n_classes {
                            return Err(format!(
                                "tree {} leaf {} has {} class weights, expected {}",
                                t,
                                idx,
                                value.len(),
                                n_classes
                            ));
                        }
                        if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(format!("tree {} leaf {} has invalid weights", t, idx));
                        }
                        let total: f64 = value.iter().sum();
                        if total <= 0.0 {
                            return Err(format!("tree {} leaf {} has zero total weight", t, idx));
                        }
                        for w in value.iter_mut() {
                            *w /= total;
                        }
                    }
                }
            }
        }

        Ok(Self {
            n_features,
            n_classes,
            trees,
        })
    }

    fn probabilities(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut proba = Array2::zeros((features.nrows(), self.n_classes));
        let n_trees = self.trees.len() as f64;

        for (row, mut out) in features.rows().into_iter().zip(proba.rows_mut()) {
            let mut acc = Array1::<f64>::zeros(self.n_classes);
            for tree in &self.trees {
                for (a, w) in acc.iter_mut().zip(tree.leaf(row)) {
                    *a += w;
                }
            }
            out.assign(&(acc / n_trees));
        }

        proba
    }
}

impl Model for ForestModel {
    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.n_classes)
    }

    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, InferenceError> {
        check_input(ModelType::RandomForest, Some(self.n_features), features)?;
        Ok(argmax_rows(&self.probabilities(features)))
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        check_input(ModelType::RandomForest, Some(self.n_features), features)?;
        Ok(self.probabilities(features))
    }
}
