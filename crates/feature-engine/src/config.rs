//! Feature Configuration and Specification

use crate::error::FeatureError;
use crate::imputer::ImputeStrategy;
use crate::normalizer::NormalizationMethod;
use crate::record::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// `features` section of the pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default)]
    pub binary: BinaryConfig,
    #[serde(default)]
    pub categorical: CategoricalConfig,
    #[serde(default)]
    pub numerical: NumericalConfig,
}

/// Columns passed through as numbers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinaryConfig {
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Columns requiring encoding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub one_hot_encode: bool,
    #[serde(default, deserialize_with = "default_if_null")]
    pub one_hot_categories: OneHotCategories,
}

/// Columns requiring normalization and imputation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericalConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub normalization: NormalizationMethod,
    #[serde(default, deserialize_with = "default_if_null")]
    pub impute_missing: ImputeStrategy,
    /// Fill used by the `constant` strategy and for columns with no observations
    #[serde(default)]
    pub fill_value: f64,
    /// Persisted fitted parameters to use instead of per-batch refitting
    #[serde(default)]
    pub fitted_params: Option<PathBuf>,
}

impl Default for NumericalConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            normalization: NormalizationMethod::None,
            impute_missing: ImputeStrategy::None,
            fill_value: 0.0,
            fitted_params: None,
        }
    }
}

/// Keyword requesting categories inferred from the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoKeyword {
    Auto,
}

/// Configured category set for one-hot encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneHotCategories {
    /// Infer from each batch
    Auto(AutoKeyword),
    /// One list per categorical column, aligned with `columns`
    PerColumn(Vec<Vec<Value>>),
    /// One list shared by every categorical column
    Shared(Vec<Value>),
}

impl Default for OneHotCategories {
    fn default() -> Self {
        OneHotCategories::Auto(AutoKeyword::Auto)
    }
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a categorical column takes its categories from
#[derive(Debug, Clone, PartialEq)]
pub enum CategorySource {
    /// Distinct values of the batch being transformed, sorted
    Inferred,
    /// Fixed categories, one list per categorical column
    Explicit(Vec<Vec<Value>>),
}

/// Immutable, validated description of the feature pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    binary_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numerical_columns: Vec<String>,
    all_columns: Vec<String>,
    one_hot_enabled: bool,
    categories: CategorySource,
    normalization: NormalizationMethod,
    imputation: ImputeStrategy,
    fill_value: f64,
}

impl FeatureSpec {
    /// Validate a configuration section and freeze it into a spec
    pub fn from_config(config: &FeatureConfig) -> Result<Self, FeatureError> {
        let binary_columns = config.binary.columns.clone();
        let categorical_columns = config.categorical.columns.clone();
        let numerical_columns = config.numerical.columns.clone();

        let all_columns: Vec<String> = binary_columns
            .iter()
            .chain(&categorical_columns)
            .chain(&numerical_columns)
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        for column in &all_columns {
            if !seen.insert(column.as_str()) {
                return Err(FeatureError::InvalidConfig(format!(
                    "column '{}' is declared more than once",
                    column
                )));
            }
        }

        let categories = match &config.categorical.one_hot_categories {
            OneHotCategories::Auto(_) => CategorySource::Inferred,
            OneHotCategories::Shared(list) => {
                CategorySource::Explicit(vec![list.clone(); categorical_columns.len()])
            }
            OneHotCategories::PerColumn(lists) => {
                if lists.len() != categorical_columns.len() {
                    return Err(FeatureError::InvalidConfig(format!(
                        "{} category lists for {} categorical columns",
                        lists.len(),
                        categorical_columns.len()
                    )));
                }
                CategorySource::Explicit(lists.clone())
            }
        };

        if let CategorySource::Explicit(lists) = &categories {
            for (column, list) in categorical_columns.iter().zip(lists) {
                check_categories(column, list)?;
            }
        }

        if !config.numerical.fill_value.is_finite() {
            return Err(FeatureError::InvalidConfig(
                "fill_value must be a finite number".to_string(),
            ));
        }

        Ok(Self {
            binary_columns,
            categorical_columns,
            numerical_columns,
            all_columns,
            one_hot_enabled: config.categorical.one_hot_encode,
            categories,
            normalization: config.numerical.normalization,
            imputation: config.numerical.impute_missing,
            fill_value: config.numerical.fill_value,
        })
    }

    pub fn binary_columns(&self) -> &[String] {
        &self.binary_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn numerical_columns(&self) -> &[String] {
        &self.numerical_columns
    }

    /// Binary, then categorical, then numerical columns in declared order
    pub fn all_columns(&self) -> &[String] {
        &self.all_columns
    }

    pub fn one_hot_enabled(&self) -> bool {
        self.one_hot_enabled
    }

    pub fn categories(&self) -> &CategorySource {
        &self.categories
    }

    pub fn normalization(&self) -> NormalizationMethod {
        self.normalization
    }

    pub fn imputation(&self) -> ImputeStrategy {
        self.imputation
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Configured categories for the categorical column at `index`, if any
    pub(crate) fn explicit_categories(&self, index: usize) -> Option<&[Value]> {
        match &self.categories {
            CategorySource::Inferred => None,
            CategorySource::Explicit(lists) => lists.get(index).map(Vec::as_slice),
        }
    }
}

fn check_categories(column: &str, list: &[Value]) -> Result<(), FeatureError> {
    for (i, category) in list.iter().enumerate() {
        if category.is_missing() {
            return Err(FeatureError::InvalidConfig(format!(
                "column '{}' lists a missing value as a category",
                column
            )));
        }
        if list[..i].contains(category) {
            return Err(FeatureError::InvalidConfig(format!(
                "column '{}' lists category '{}' twice",
                column,
                category.label()
            )));
        }
    }
    Ok(())
}
