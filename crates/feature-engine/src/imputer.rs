//! Missing Value Imputation

use crate::statistics::{self, ColumnStatistics};
use serde::{Deserialize, Serialize};

/// Strategy for filling missing numerical values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Leave missing values as NaN
    #[default]
    None,
    /// Mean of the observed values
    Mean,
    /// Median of the observed values
    Median,
    /// Most frequent observed value
    #[serde(alias = "most-frequent")]
    MostFrequent,
    /// Configured constant
    Constant,
}

impl ImputeStrategy {
    /// Compute the fill value for a column.
    ///
    /// Returns `None` when the strategy needs observations and the column has none.
    pub fn fill_value(&self, values: &[f64], constant: f64) -> Option<f64> {
        match self {
            ImputeStrategy::None => None,
            ImputeStrategy::Mean => {
                let stats = ColumnStatistics::compute(values);
                (!stats.is_empty()).then_some(stats.mean)
            }
            ImputeStrategy::Median => statistics::median(values),
            ImputeStrategy::MostFrequent => statistics::most_frequent(values),
            ImputeStrategy::Constant => Some(constant),
        }
    }
}

/// Replace every NaN in the column with `fill`
pub fn fill_missing(values: &mut [f64], fill: f64) -> usize {
    let mut filled = 0;
    for v in values.iter_mut().filter(|v| v.is_nan()) {
        *v = fill;
        filled += 1;
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let mut values = vec![1.0, f64::NAN, 3.0];
        let fill = ImputeStrategy::Median.fill_value(&values, 0.0).unwrap();
        assert_eq!(fill_missing(&mut values, fill), 1);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mean_imputation() {
        let values = vec![1.0, f64::NAN, 2.0, 6.0];
        assert_eq!(ImputeStrategy::Mean.fill_value(&values, 0.0), Some(3.0));
    }

    #[test]
    fn test_most_frequent_imputation() {
        let values = vec![2.0, f64::NAN, 2.0, 9.0];
        assert_eq!(ImputeStrategy::MostFrequent.fill_value(&values, 0.0), Some(2.0));
    }

    #[test]
    fn test_constant_imputation() {
        let values = vec![f64::NAN, f64::NAN];
        assert_eq!(ImputeStrategy::Constant.fill_value(&values, -1.0), Some(-1.0));
    }

    #[test]
    fn test_all_missing_has_no_statistic() {
        let values = vec![f64::NAN, f64::NAN];
        assert_eq!(ImputeStrategy::Mean.fill_value(&values, 0.0), None);
        assert_eq!(ImputeStrategy::Median.fill_value(&values, 0.0), None);
        assert_eq!(ImputeStrategy::None.fill_value(&values, 0.0), None);
    }

    #[test]
    fn test_strategy_names() {
        let parsed: ImputeStrategy = serde_json::from_str("\"most_frequent\"").unwrap();
        assert_eq!(parsed, ImputeStrategy::MostFrequent);
        let parsed: ImputeStrategy = serde_json::from_str("\"most-frequent\"").unwrap();
        assert_eq!(parsed, ImputeStrategy::MostFrequent);
    }
}
