//! Task (issue) model.
//!
//! A task is an open record of named attributes: numeric metrics, boolean
//! flags, and one-hot encoded categories produced upstream. The allocator
//! only requires `burnedPoints`; the classifier's feature schema decides
//! which other attributes matter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EffortClass;

/// Attribute holding the ground-truth effort of a task.
pub const BURNED_POINTS: &str = "burnedPoints";
/// Attribute the allocator writes the derived effort class into.
pub const CLASS: &str = "class";
/// Attribute listing historical assignees on training records.
pub const ASSIGNEES: &str = "assignees";

/// A unit of work to be distributed.
///
/// Serialized transparently as a JSON object, so request payloads map onto
/// tasks without a wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task {
    /// Named attributes, keyed by feature name.
    pub attributes: Map<String, Value>,
}

impl Task {
    /// Creates an empty task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the burned points.
    pub fn with_burned_points(self, burned_points: f64) -> Self {
        self.with_attribute(BURNED_POINTS, burned_points)
    }

    /// Sets the historical assignees (training records only).
    pub fn with_assignees<S: Into<String>>(self, assignees: impl IntoIterator<Item = S>) -> Self {
        let list: Vec<Value> = assignees
            .into_iter()
            .map(|a| Value::String(a.into()))
            .collect();
        self.with_attribute(ASSIGNEES, list)
    }

    /// Looks up an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Whether the attribute is present (even if `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Burned points, if present and numeric.
    pub fn burned_points(&self) -> Option<f64> {
        self.get(BURNED_POINTS).and_then(Value::as_f64)
    }

    /// Effort class derived from burned points.
    pub fn derived_class(&self) -> Option<EffortClass> {
        self.burned_points().map(EffortClass::from_burned_points)
    }

    /// The `class` tag, if one has been attached.
    pub fn class(&self) -> Option<EffortClass> {
        self.get(CLASS)
            .and_then(Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .and_then(|v| EffortClass::try_from(v).ok())
    }

    /// Attaches the `class` tag.
    pub fn set_class(&mut self, class: EffortClass) {
        self.attributes
            .insert(CLASS.to_string(), Value::from(class.value()));
    }

    /// Historical assignees; non-string entries are ignored.
    pub fn assignees(&self) -> Vec<&str> {
        match self.get(ASSIGNEES) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for Task {
    fn from(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_builder() {
        let task = Task::new()
            .with_burned_points(1.5)
            .with_attribute("expectedPoints", 2)
            .with_attribute("hasPullRequest", true)
            .with_assignees(["alice", "bob"]);

        assert_eq!(task.burned_points(), Some(1.5));
        assert_eq!(task.get("expectedPoints"), Some(&json!(2)));
        assert!(task.contains("hasPullRequest"));
        assert_eq!(task.assignees(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_transparent_serde() {
        let task: Task =
            serde_json::from_value(json!({"burnedPoints": 3, "labels_bug": 1})).unwrap();
        assert_eq!(task.burned_points(), Some(3.0));
        assert_eq!(task.derived_class(), Some(EffortClass::High));

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back, json!({"burnedPoints": 3, "labels_bug": 1}));
    }

    #[test]
    fn test_class_tag() {
        let mut task = Task::new().with_burned_points(0.2);
        assert_eq!(task.class(), None);
        task.set_class(EffortClass::Low);
        assert_eq!(task.class(), Some(EffortClass::Low));
        assert_eq!(task.get(CLASS), Some(&json!(1)));
    }

    #[test]
    fn test_non_numeric_burned_points() {
        let task = Task::new().with_attribute(BURNED_POINTS, "lots");
        assert_eq!(task.burned_points(), None);
        assert_eq!(task.derived_class(), None);
    }

    #[test]
    fn test_assignees_missing() {
        assert!(Task::new().assignees().is_empty());
    }
}
