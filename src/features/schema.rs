//! Feature schema: the ordered columns a classifier was trained on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{AllotError, Result};

/// Ordered, named feature columns.
///
/// Names are unique and non-empty. The schema is immutable once built;
/// column order is the classifier's input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl FeatureSchema {
    /// Builds a schema, rejecting empty and duplicate column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &columns {
            if name.is_empty() {
                return Err(AllotError::SchemaMismatch(
                    "feature schema contains an empty column name".into(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(AllotError::SchemaMismatch(format!(
                    "feature schema contains duplicate column '{name}'"
                )));
            }
        }
        let names = columns.iter().cloned().collect();
        Ok(Self { columns, names })
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether a column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = AllotError;

    fn try_from(columns: Vec<String>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup() {
        let schema = FeatureSchema::new(["expectedPoints", "alice", "bob"]).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.columns()[1], "alice");
        assert!(schema.contains("bob"));
        assert!(!schema.contains("carol"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = FeatureSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, AllotError::SchemaMismatch(_)));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(FeatureSchema::new(["a", ""]).is_err());
    }

    #[test]
    fn test_serde_as_list() {
        let schema = FeatureSchema::new(["x", "y"]).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"["x","y"]"#);
        let back: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position("y"), Some(1));
        assert!(serde_json::from_str::<FeatureSchema>(r#"["x","x"]"#).is_err());
    }
}
