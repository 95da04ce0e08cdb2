//! Numerical Column Normalization

use crate::statistics::ColumnStatistics;
use serde::{Deserialize, Serialize};

/// Normalization method for numerical columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMethod {
    /// Leave values untouched
    #[default]
    None,
    /// Z-score normalization using the column mean and standard deviation
    Standard,
    /// Min-max normalization to [0, 1]
    #[serde(alias = "min_max", alias = "min-max")]
    MinMax,
}

/// Fitted rescaling for a single numerical column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Scaler {
    /// No rescaling
    Identity,
    /// `(x - mean) / scale`
    Standard { mean: f64, scale: f64 },
    /// `(x - min) / scale`
    MinMax { min: f64, scale: f64 },
}

impl Scaler {
    /// Fit a scaler on a column; NaN entries are ignored.
    ///
    /// A zero spread falls back to a scale of 1 so constant columns map to 0.
    pub fn fit(method: NormalizationMethod, values: &[f64]) -> Self {
        let stats = ColumnStatistics::compute(values);
        match method {
            NormalizationMethod::None => Scaler::Identity,
            NormalizationMethod::Standard => Scaler::Standard {
                mean: stats.mean,
                scale: non_zero(stats.std_dev),
            },
            NormalizationMethod::MinMax => Scaler::MinMax {
                min: stats.min,
                scale: non_zero(if stats.is_empty() { 0.0 } else { stats.max - stats.min }),
            },
        }
    }

    /// Method this scaler was fitted with
    pub fn method(&self) -> NormalizationMethod {
        match self {
            Scaler::Identity => NormalizationMethod::None,
            Scaler::Standard { .. } => NormalizationMethod::Standard,
            Scaler::MinMax { .. } => NormalizationMethod::MinMax,
        }
    }

    /// Rescale a single value. NaN stays NaN.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Scaler::Identity => value,
            Scaler::Standard { mean, scale } => (value - mean) / scale,
            Scaler::MinMax { min, scale } => (value - min) / scale,
        }
    }

    /// Rescale a whole column in place
    pub fn apply_column(&self, values: &mut [f64]) {
        if matches!(self, Scaler::Identity) {
            return;
        }
        for v in values.iter_mut() {
            *v = self.apply(*v);
        }
    }
}

fn non_zero(spread: f64) -> f64 {
    if spread == 0.0 || !spread.is_finite() {
        1.0
    } else {
        spread
    }
}
