//! One-hot encoding of categorical task fields.
//!
//! `categories`, `focus_areas` and `labels` hold a string or a list of
//! strings. A list is sorted and joined with `,` so that every distinct
//! combination becomes one category. The task then carries a 1 in column
//! `<field>_<category>`:
//!
//! | Value | Column |
//! |-------|--------|
//! | `"ui"` | `categories_ui` |
//! | `["ux", "bug"]` | `labels_bug,ux` |
//! | `[]` | `labels_` |
//! | `null` / absent | none |

use serde_json::Value;

use crate::models::Task;

/// Fields one-hot encoded by category.
pub const CATEGORICAL_FIELDS: [&str; 3] = ["categories", "focus_areas", "labels"];

/// Whether `key` names a categorical field.
pub fn is_categorical(key: &str) -> bool {
    CATEGORICAL_FIELDS.contains(&key)
}

/// Category of a field value, if it has one.
pub fn category_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(scalar_text).collect();
            parts.sort();
            Some(parts.join(","))
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Object(_) => None,
    }
}

/// One-hot column names set to 1 for `task`.
pub fn encoded_columns(task: &Task) -> Vec<String> {
    CATEGORICAL_FIELDS
        .iter()
        .filter_map(|field| {
            let category = category_of(task.get(field)?)?;
            Some(format!("{field}_{category}"))
        })
        .collect()
}

/// Value of a one-hot `column` for `task`.
///
/// `None` when `column` is not `<field>_...` for a categorical field the
/// task carries.
pub(crate) fn indicator(task: &Task, column: &str) -> Option<f64> {
    CATEGORICAL_FIELDS.iter().find_map(|field| {
        let category = column.strip_prefix(field)?.strip_prefix('_')?;
        let own = category_of(task.get(field)?)?;
        Some(if own == category { 1.0 } else { 0.0 })
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
