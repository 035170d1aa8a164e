//! Feature materialization for a (task, candidate assignee) pair.
//!
//! # Algorithm
//!
//! For each schema column, in order:
//! 1. Column equals the candidate assignee → `1.0`.
//! 2. Column absent from the task → its categorical one-hot value when the
//!    column is `<field>_<category>` for a categorical field the task
//!    carries, else `0.0`.
//! 3. `null` → `0.0`; otherwise the task's value, verbatim (booleans
//!    become 1/0).
//!
//! Only schema columns are visited, so task attributes outside the schema
//! never reach the classifier. A task attribute named after some other
//! assignee keeps its own value.

use serde_json::Value;

use super::{categorical, FeatureSchema};
use crate::error::{AllotError, Result};
use crate::models::Task;

/// A single-row feature vector in schema order.
pub type FeatureVector = Vec<f64>;

/// Builds classifier input rows against a fixed schema.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMaterializer<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureMaterializer<'a> {
    /// Creates a materializer for `schema`.
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    /// The schema rows are built against.
    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    /// Builds the row for `task` evaluated as if assigned to `candidate`.
    ///
    /// The task is read only; no attribute is written.
    ///
    /// # Errors
    /// `SchemaMismatch` if a schema column holds a value that is not a
    /// number, boolean, or `null`.
    pub fn materialize(&self, task: &Task, candidate: &str) -> Result<FeatureVector> {
        self.schema
            .columns()
            .iter()
            .map(|column| {
                if column == candidate {
                    return Ok(1.0);
                }
                match task.get(column) {
                    None => Ok(categorical::indicator(task, column).unwrap_or(0.0)),
                    Some(value) => feature_value(value).ok_or_else(|| {
                        AllotError::SchemaMismatch(format!(
                            "column '{column}' holds non-numeric value {value}"
                        ))
                    }),
                }
            })
            .collect()
    }
}

/// Numeric reading of an attribute value, if it has one.
pub(crate) fn feature_value(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
