//! Feature Matrix

use crate::error::FeatureError;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Numeric matrix consumed by the classifier, one row per input record
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    columns: Vec<String>,
}

impl FeatureMatrix {
    /// Wrap values with one name per column
    pub fn new(values: Array2<f64>, columns: Vec<String>) -> Result<Self, FeatureError> {
        if values.ncols() != columns.len() {
            return Err(FeatureError::ShapeMismatch {
                columns: columns.len(),
                width: values.ncols(),
            });
        }
        Ok(Self { values, columns })
    }

    /// Wrap values with positional names `x0`, `x1`, ...
    pub fn from_array(values: Array2<f64>) -> Self {
        let columns = (0..values.ncols()).map(|i| format!("x{}", i)).collect();
        Self { values, columns }
    }

    /// Assemble from column vectors of equal length `rows`
    pub(crate) fn from_columns(rows: usize, data: Vec<Vec<f64>>, columns: Vec<String>) -> Self {
        debug_assert_eq!(data.len(), columns.len());
        let values = Array2::from_shape_fn((rows, data.len()), |(r, c)| data[c][r]);
        Self { values, columns }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Output column names in matrix order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// Column with the given output name
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_columns_layout() {
        let matrix = FeatureMatrix::from_columns(
            2,
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec!["a".to_string(), "b".to_string()],
        );
        assert_eq!(matrix.values(), &array![[1.0, 3.0], [2.0, 4.0]]);
        assert_eq!(matrix.column("b").unwrap().to_vec(), vec![3.0, 4.0]);
        assert!(matrix.column("c").is_none());
    }

    #[test]
    fn test_new_checks_width() {
        let result = FeatureMatrix::new(array![[1.0, 2.0]], vec!["a".to_string()]);
        assert!(matches!(
            result,
            Err(FeatureError::ShapeMismatch { columns: 1, width: 2 })
        ));
    }

    #[test]
    fn test_positional_names() {
        let matrix = FeatureMatrix::from_array(array![[0.0, 1.0, 2.0]]);
        assert_eq!(matrix.columns(), ["x0", "x1", "x2"]);
    }
}
