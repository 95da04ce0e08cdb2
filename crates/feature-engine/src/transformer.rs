//! Feature Transformer
//!
//! Maps a raw record batch to a feature matrix in a fixed step order:
//! select, categorical encode, normalize, impute.

use crate::config::{FeatureConfig, FeatureSpec};
use crate::encoder::{infer_categories, CategoricalEncoder};
use crate::error::FeatureError;
use crate::fitted::{FittedCategorical, FittedNumerical, FittedParams};
use crate::imputer::{fill_missing, ImputeStrategy};
use crate::matrix::FeatureMatrix;
use crate::normalizer::Scaler;
use crate::record::{RecordBatch, Value};
use tracing::{debug, info, warn};

/// Columns of a batch projected onto the spec, numeric groups already parsed
struct Selection<'b> {
    rows: usize,
    binary: Vec<Vec<f64>>,
    categorical: Vec<Vec<&'b Value>>,
    numerical: Vec<Vec<f64>>,
}

/// Configuration-driven feature transformer.
///
/// Holds only immutable state, so one instance can serve concurrent callers.
/// Unless persisted [`FittedParams`] are attached, every call to
/// [`transform`](Self::transform) fits its statistics on the batch it is given.
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    spec: FeatureSpec,
    fitted: Option<FittedParams>,
}

impl FeatureTransformer {
    /// Create a transformer that refits statistics on every batch
    pub fn new(spec: FeatureSpec) -> Self {
        info!(
            "Creating feature transformer: {} binary, {} categorical (one-hot={}), {} numerical ({:?}, impute={:?})",
            spec.binary_columns().len(),
            spec.categorical_columns().len(),
            spec.one_hot_enabled(),
            spec.numerical_columns().len(),
            spec.normalization(),
            spec.imputation()
        );
        Self { spec, fitted: None }
    }

    /// Build from the `features` configuration section.
    ///
    /// Loads persisted fitted parameters when `numerical.fitted_params` is set.
    pub fn from_config(config: &FeatureConfig) -> Result<Self, FeatureError> {
        let transformer = Self::new(FeatureSpec::from_config(config)?);
        match &config.numerical.fitted_params {
            Some(path) => transformer.with_fitted_params(FittedParams::load(path)?),
            None => Ok(transformer),
        }
    }

    /// Use fixed parameters instead of refitting on every batch
    pub fn with_fitted_params(mut self, params: FittedParams) -> Result<Self, FeatureError> {
        params.check(&self.spec)?;
        info!("Feature transformer using persisted fitted parameters");
        self.fitted = Some(params);
        Ok(self)
    }

    pub fn spec(&self) -> &FeatureSpec {
        &self.spec
    }

    /// Persisted parameters, if attached
    pub fn fitted_params(&self) -> Option<&FittedParams> {
        self.fitted.as_ref()
    }

    /// Transform a batch into a feature matrix
    pub fn transform(&self, batch: &RecordBatch) -> Result<FeatureMatrix, FeatureError> {
        let selection = self.select(batch)?;
        match &self.fitted {
            Some(params) => self.apply(&selection, params),
            None => {
                let params = self.fit_selection(&selection);
                self.apply(&selection, &params)
            }
        }
    }

    /// Fit per-column statistics on a batch without transforming it
    pub fn fit(&self, batch: &RecordBatch) -> Result<FittedParams, FeatureError> {
        let selection = self.select(batch)?;
        Ok(self.fit_selection(&selection))
    }

    /// Transform a batch with the given parameters, ignoring any attached ones
    pub fn transform_with(
        &self,
        batch: &RecordBatch,
        params: &FittedParams,
    ) -> Result<FeatureMatrix, FeatureError> {
        params.check(&self.spec)?;
        let selection = self.select(batch)?;
        self.apply(&selection, params)
    }

    /// Project the batch onto the declared columns.
    ///
    /// Every record is checked for every column before any value is parsed.
    fn select<'b>(&self, batch: &'b RecordBatch) -> Result<Selection<'b>, FeatureError> {
        for (row, record) in batch.records().iter().enumerate() {
            if let Some(column) = self
                .spec
                .all_columns()
                .iter()
                .find(|c| !record.contains_key(c.as_str()))
            {
                return Err(FeatureError::MissingColumn {
                    row,
                    column: column.clone(),
                });
            }
        }

        let cells = move |column: &str| -> Vec<&'b Value> {
            batch
                .records()
                .iter()
                .filter_map(|record| record.get(column))
                .collect()
        };

        let numeric = |column: &String| -> Result<Vec<f64>, FeatureError> {
            cells(column.as_str())
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value.to_number() {
                    Ok(n) => Ok(n.unwrap_or(f64::NAN)),
                    Err(_) => Err(FeatureError::NonNumeric {
                        row,
                        column: column.clone(),
                        value: value.label(),
                    }),
                })
                .collect()
        };

        Ok(Selection {
            rows: batch.len(),
            binary: self
                .spec
                .binary_columns()
                .iter()
                .map(&numeric)
                .collect::<Result<_, _>>()?,
            categorical: self
                .spec
                .categorical_columns()
                .iter()
                .map(|c| cells(c.as_str()))
                .collect(),
            numerical: self
                .spec
                .numerical_columns()
                .iter()
                .map(&numeric)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Fit categories, scalers and imputation fills on a selection.
    ///
    /// Fills are computed on normalized values because imputation runs after
    /// normalization.
    fn fit_selection(&self, selection: &Selection<'_>) -> FittedParams {
        let categorical = self
            .spec
            .categorical_columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| FittedCategorical {
                column: column.clone(),
                categories: match self.spec.explicit_categories(idx) {
                    Some(categories) => categories.to_vec(),
                    None => infer_categories(selection.categorical[idx].iter().copied()),
                },
            })
            .collect();

        let numerical = self
            .spec
            .numerical_columns()
            .iter()
            .zip(&selection.numerical)
            .map(|(column, values)| {
                let scaler = Scaler::fit(self.spec.normalization(), values);
                let fill = match self.spec.imputation() {
                    ImputeStrategy::None => None,
                    strategy => {
                        let mut normalized = values.clone();
                        scaler.apply_column(&mut normalized);
                        Some(
                            strategy
                                .fill_value(&normalized, self.spec.fill_value())
                                .unwrap_or_else(|| {
                                    warn!(
                                        "Column '{}' has no observed values, imputing {}",
                                        column,
                                        self.spec.fill_value()
                                    );
                                    self.spec.fill_value()
                                }),
                        )
                    }
                };
                FittedNumerical {
                    column: column.clone(),
                    scaler,
                    fill,
                }
            })
            .collect();

        FittedParams {
            categorical,
            numerical,
        }
    }

    fn apply(
        &self,
        selection: &Selection<'_>,
        params: &FittedParams,
    ) -> Result<FeatureMatrix, FeatureError> {
        let mut data: Vec<Vec<f64>> = Vec::new();
        let mut names: Vec<String> = Vec::new();

        // 1. Binary columns pass through
        for (column, values) in self.spec.binary_columns().iter().zip(&selection.binary) {
            data.push(values.clone());
            names.push(column.clone());
        }

        // 2. Categorical encode
        for (column, values) in self
            .spec
            .categorical_columns()
            .iter()
            .zip(&selection.categorical)
        {
            let categories = params.categories_for(column).ok_or_else(|| {
                FeatureError::FittedParams(format!("no categories fitted for column '{}'", column))
            })?;
            let encoder = CategoricalEncoder::new(categories);

            let unknown = if self.spec.one_hot_enabled() {
                let (indicators, unknown) = encoder.one_hot(values);
                data.extend(indicators);
                names.extend(
                    categories
                        .iter()
                        .map(|category| format!("{}_{}", column, category.label())),
                );
                unknown
            } else {
                let (codes, unknown) = encoder.label(values);
                data.push(codes);
                names.push(column.clone());
                unknown
            };

            if unknown > 0 {
                debug!(
                    "Column '{}': {} value(s) outside {} known categories",
                    column,
                    unknown,
                    categories.len()
                );
            }
        }

        // 3. Normalize, 4. Impute
        for (column, values) in self
            .spec
            .numerical_columns()
            .iter()
            .zip(&selection.numerical)
        {
            let fitted = params.numerical_for(column).ok_or_else(|| {
                FeatureError::FittedParams(format!("no scaler fitted for column '{}'", column))
            })?;

            let mut values = values.clone();
            fitted.scaler.apply_column(&mut values);
            if let Some(fill) = fitted.fill {
                fill_missing(&mut values, fill);
            }

            data.push(values);
            names.push(column.clone());
        }

        debug!(
            "Transformed batch: {} rows x {} feature columns",
            selection.rows,
            data.len()
        );

        Ok(FeatureMatrix::from_columns(selection.rows, data, names))
    }
}
