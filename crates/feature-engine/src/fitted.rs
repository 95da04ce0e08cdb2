//! Persisted Fitted Parameters
//!
//! Per-column statistics computed by [`FeatureTransformer::fit`](crate::FeatureTransformer::fit).
//! Storing them next to the model artifact lets serving reuse training-time
//! scaling instead of refitting on every batch.

use crate::config::FeatureSpec;
use crate::error::FeatureError;
use crate::imputer::ImputeStrategy;
use crate::normalizer::Scaler;
use crate::record::Value;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Category set fitted for one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedCategorical {
    pub column: String,
    pub categories: Vec<Value>,
}

/// Scaler and imputation fill fitted for one numerical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNumerical {
    pub column: String,
    pub scaler: Scaler,
    /// `None` leaves missing values as NaN
    pub fill: Option<f64>,
}

/// Fitted state of the whole feature pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    #[serde(default)]
    pub categorical: Vec<FittedCategorical>,
    #[serde(default)]
    pub numerical: Vec<FittedNumerical>,
}

impl FittedParams {
    /// Read parameters from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        info!(
            "Loaded fitted parameters from {} ({} categorical, {} numerical)",
            path.display(),
            params.categorical.len(),
            params.numerical.len()
        );
        Ok(params)
    }

    /// Write parameters as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FeatureError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Categories fitted for `column`
    pub fn categories_for(&self, column: &str) -> Option<&[Value]> {
        self.categorical
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.as_slice())
    }

    /// Numerical parameters fitted for `column`
    pub fn numerical_for(&self, column: &str) -> Option<&FittedNumerical> {
        self.numerical.iter().find(|n| n.column == column)
    }

    /// Ensure every categorical and numerical column of the spec is covered,
    /// with the spec's normalization method and imputation setting
    pub fn check(&self, spec: &FeatureSpec) -> Result<(), FeatureError> {
        for column in spec.categorical_columns() {
            if self.categories_for(column).is_none() {
                return Err(FeatureError::FittedParams(format!(
                    "no categories fitted for column '{}'",
                    column
                )));
            }
        }
        for column in spec.numerical_columns() {
            match self.numerical_for(column) {
                None => {
                    return Err(FeatureError::FittedParams(format!(
                        "no scaler fitted for column '{}'",
                        column
                    )))
                }
                Some(params) => check_numerical(params, spec)?,
            }
        }
        Ok(())
    }
}

fn check_numerical(params: &FittedNumerical, spec: &FeatureSpec) -> Result<(), FeatureError> {
    let column = &params.column;
    if params.scaler.method() != spec.normalization() {
        return Err(FeatureError::FittedParams(format!(
            "column '{}' was fitted with {:?} normalization, configuration asks for {:?}",
            column,
            params.scaler.method(),
            spec.normalization()
        )));
    }

    let imputing = spec.imputation() != ImputeStrategy::None;
    match params.fill {
        None if imputing => Err(FeatureError::FittedParams(format!(
            "no imputation fill fitted for column '{}'",
            column
        ))),
        Some(_) if !imputing => Err(FeatureError::FittedParams(format!(
            "column '{}' has a fitted fill but imputation is disabled",
            column
        ))),
        Some(fill) if !fill.is_finite() => Err(FeatureError::FittedParams(format!(
            "non-finite fill value for column '{}'",
            column
        ))),
        _ => Ok(()),
    }
}
