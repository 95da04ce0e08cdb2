//! Categorical Column Encoding

use crate::record::Value;

/// Code written by the label encoder for unknown and missing values
pub const UNKNOWN_CODE: f64 = -1.0;

/// What to do with a value outside the known category set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Emit no active indicator (all-zero one-hot group)
    #[default]
    Ignore,
}

/// Distinct non-missing values of a column in category order
pub fn infer_categories<'a, I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut categories: Vec<Value> = values
        .into_iter()
        .filter(|v| !v.is_missing())
        .cloned()
        .collect();
    categories.sort_by(|a, b| a.category_cmp(b));
    categories.dedup_by(|a, b| a.category_cmp(b).is_eq());
    categories
}

/// Encoder over a fixed, ordered category set
#[derive(Debug, Clone)]
pub struct CategoricalEncoder<'a> {
    categories: &'a [Value],
    policy: UnknownCategoryPolicy,
}

impl<'a> CategoricalEncoder<'a> {
    pub fn new(categories: &'a [Value]) -> Self {
        Self {
            categories,
            policy: UnknownCategoryPolicy::Ignore,
        }
    }

    /// Position of a value in the category set
    pub fn position(&self, value: &Value) -> Option<usize> {
        if value.is_missing() {
            return None;
        }
        self.categories
            .iter()
            .position(|c| c.category_cmp(value).is_eq())
    }

    /// One indicator column per category.
    ///
    /// Returns the columns together with the number of values that matched no category.
    pub fn one_hot(&self, values: &[&Value]) -> (Vec<Vec<f64>>, usize) {
        let mut columns = vec![vec![0.0; values.len()]; self.categories.len()];
        let mut unknown = 0;

        for (row, value) in values.iter().enumerate() {
            match self.position(value) {
                Some(idx) => columns[idx][row] = 1.0,
                None => match self.policy {
                    UnknownCategoryPolicy::Ignore => unknown += 1,
                },
            }
        }

        (columns, unknown)
    }

    /// Single column of category indices, `UNKNOWN_CODE` when unmatched
    pub fn label(&self, values: &[&Value]) -> (Vec<f64>, usize) {
        let mut unknown = 0;
        let codes = values
            .iter()
            .map(|value| match self.position(value) {
                Some(idx) => idx as f64,
                None => {
                    unknown += 1;
                    UNKNOWN_CODE
                }
            })
            .collect();

        (codes, unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&s| Value::from(s)).collect()
    }

    #[test]
    fn test_one_hot_with_unseen_value() {
        let categories = text(&["A", "B", "C"]);
        let values = text(&["A", "B", "Z"]);
        let refs: Vec<&Value> = values.iter().collect();

        let (columns, unknown) = CategoricalEncoder::new(&categories).one_hot(&refs);

        // Columns are per category; rows read across them
        let rows: Vec<Vec<f64>> = (0..3)
            .map(|r| columns.iter().map(|c| c[r]).collect())
            .collect();
        assert_eq!(rows, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 0.0]]);
        assert_eq!(unknown, 1);
    }

    #[test]
    fn test_missing_value_is_unknown() {
        let categories = text(&["A"]);
        let values = vec![Value::Missing, Value::from("A")];
        let refs: Vec<&Value> = values.iter().collect();

        let (columns, unknown) = CategoricalEncoder::new(&categories).one_hot(&refs);
        assert_eq!(columns, vec![vec![0.0, 1.0]]);
        assert_eq!(unknown, 1);
    }

    #[test]
    fn test_label_encoding() {
        let categories = text(&["jazz", "rock"]);
        let values = text(&["rock", "jazz", "polka"]);
        let refs: Vec<&Value> = values.iter().collect();

        let (codes, unknown) = CategoricalEncoder::new(&categories).label(&refs);
        assert_eq!(codes, vec![1.0, 0.0, UNKNOWN_CODE]);
        assert_eq!(unknown, 1);
    }

    #[test]
    fn test_infer_categories_sorted_and_distinct() {
        let values = vec![
            Value::from("minor"),
            Value::Missing,
            Value::from("major"),
            Value::from("minor"),
        ];
        assert_eq!(infer_categories(&values), text(&["major", "minor"]));

        let values = vec![Value::Number(10.0), Value::Number(2.0), Value::Number(10.0)];
        assert_eq!(
            infer_categories(&values),
            vec![Value::Number(2.0), Value::Number(10.0)]
        );
    }

    #[test]
    fn test_no_coercion_between_kinds() {
        let categories = vec![Value::Number(1.0)];
        let encoder = CategoricalEncoder::new(&categories);
        assert_eq!(encoder.position(&Value::Number(1.0)), Some(0));
        assert_eq!(encoder.position(&Value::from("1")), None);
    }
}
