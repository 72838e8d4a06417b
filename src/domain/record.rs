//! Raw source records
//!
//! A [`RawRecord`] is one row as returned by a query executor: an ordered list
//! of column name / scalar value pairs. Values are held as [`serde_json::Value`]
//! scalars so that feed transformers can move them into output records without
//! another conversion step.

use crate::domain::errors::TransformError;
use serde_json::Value;

/// One source row, columns in query order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    columns: Vec<(String, Value)>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` columns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Append a column
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.columns.push((column.into(), value));
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value.into());
        self
    }

    /// Replace the value of an existing column, or append it
    pub fn set(&mut self, column: &str, value: Value) {
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.push(column, value),
        }
    }

    /// Remove a column, returning its value
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.columns.iter().position(|(name, _)| name == column)?;
        Some(self.columns.remove(idx).1)
    }

    /// Look up a column by name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Look up a column that the caller cannot do without
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingField`] if the column is absent.
    pub fn require(&self, column: &str) -> Result<&Value, TransformError> {
        self.get(column)
            .ok_or_else(|| TransformError::MissingField(column.to_string()))
    }

    /// Column names in query order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the record has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_and_require() {
        let record = RawRecord::new().with("id", 7).with("name", "Pool");

        assert_eq!(record.get("id"), Some(&json!(7)));
        assert_eq!(record.require("name").unwrap(), &json!("Pool"));
        assert_eq!(
            record.require("phone"),
            Err(TransformError::MissingField("phone".to_string()))
        );
    }

    #[test]
    fn test_column_order_is_preserved() {
        let record: RawRecord = vec![
            ("b", json!(1)),
            ("a", json!(2)),
            ("c", Value::Null),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = record.column_names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_null_value_is_present() {
        let record = RawRecord::new().with("url", Value::Null);
        assert_eq!(record.require("url").unwrap(), &Value::Null);
    }

    #[test]
    fn test_set_and_remove() {
        let mut record = RawRecord::new().with("id", 1).with("name", "Pool");

        record.set("id", json!(2));
        record.set("url", Value::Null);
        assert_eq!(record.get("id"), Some(&json!(2)));
        assert_eq!(record.len(), 3);

        assert_eq!(record.remove("name"), Some(json!("Pool")));
        assert_eq!(record.remove("name"), None);
        assert_eq!(record.column_names().collect::<Vec<_>>(), vec!["id", "url"]);
    }
}
