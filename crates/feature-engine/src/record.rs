//! Raw Song Records

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Spellings of a missing value inside text cells
const MISSING_TOKENS: [&str; 5] = ["na", "nan", "null", "none", "n/a"];

/// Text cell that does not parse as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotNumeric;

/// Scalar cell of a raw record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Coerce the cell to a number.
    ///
    /// Returns `Ok(None)` for missing cells (including NaN and the usual
    /// textual spellings of a missing value) and `Err(NotNumeric)` for text that is
    /// not a number.
    pub fn to_number(&self) -> Result<Option<f64>, NotNumeric> {
        match self {
            Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) if n.is_nan() => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty()
                    || MISSING_TOKENS
                        .iter()
                        .any(|token| trimmed.eq_ignore_ascii_case(token))
                {
                    Ok(None)
                } else {
                    trimmed.parse::<f64>().map(Some).map_err(|_| NotNumeric)
                }
            }
            Value::Missing => Ok(None),
        }
    }

    /// Whether the cell carries no observation
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Total order used to sort inferred categories.
    ///
    /// Booleans sort before numbers, numbers before text, and missing last.
    pub fn category_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Bool(_) => 0,
                Value::Number(_) => 1,
                Value::Text(_) => 2,
                Value::Missing => 3,
            }
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }

    /// Render the cell for output column names and error messages
    pub fn label(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
            Value::Missing => "null".to_string(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// One raw song record: column name to cell
pub type Record = HashMap<String, Value>;

/// Ordered batch of raw records processed in one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBatch {
    records: Vec<Record>,
}

impl RecordBatch {
    /// Create a batch from records, keeping their order
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a batch from a JSON array of objects
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in input order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Append a record at the end of the batch
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl FromIterator<Record> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
