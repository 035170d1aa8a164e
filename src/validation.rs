//! Input validation for distribution requests.
//!
//! Checks structural integrity of tasks and assignees before any
//! classifier call. Detects:
//! - Empty assignee list
//! - Blank or duplicate assignee identifiers
//! - Missing or non-numeric burned points

use std::collections::HashSet;

use crate::error::AllotError;
use crate::models::{Task, BURNED_POINTS};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No assignees were supplied.
    EmptyAssignees,
    /// An assignee identifier is empty or whitespace.
    BlankAssignee,
    /// Two assignees share the same identifier.
    DuplicateAssignee,
    /// A task has no numeric `burnedPoints`.
    MissingBurnedPoints,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a distribution request.
///
/// Checks:
/// 1. At least one assignee
/// 2. No blank assignee IDs
/// 3. No duplicate assignee IDs
/// 4. Every task carries numeric burned points
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request<S: AsRef<str>>(tasks: &[Task], assignees: &[S]) -> ValidationResult {
    let mut errors = Vec::new();

    if assignees.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyAssignees,
            "At least one assignee is required",
        ));
    }

    let mut seen = HashSet::new();
    for (i, assignee) in assignees.iter().enumerate() {
        let id = assignee.as_ref();
        if id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankAssignee,
                format!("Assignee at position {i} is blank"),
            ));
        } else if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateAssignee,
                format!("Duplicate assignee: {id}"),
            ));
        }
    }

    errors.extend(check_tasks(tasks));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates burned points on every task.
pub fn validate_tasks(tasks: &[Task]) -> ValidationResult {
    let errors = check_tasks(tasks);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_tasks(tasks: &[Task]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        if task.burned_points().is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingBurnedPoints,
                format!("Task {} has no numeric '{BURNED_POINTS}'", i + 1),
            ));
        }
    }
    errors
}

/// Folds a list of validation errors into one `InvalidInput` error.
pub fn into_error(errors: Vec<ValidationError>) -> AllotError {
    let joined = errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ");
    AllotError::InvalidInput(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new().with_burned_points(0.5),
            Task::new().with_burned_points(3.0),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_request(&sample_tasks(), &["alice", "bob"]).is_ok());
    }

    #[test]
    fn test_empty_tasks_allowed() {
        assert!(validate_request(&[], &["alice"]).is_ok());
    }

    #[test]
    fn test_empty_assignees() {
        let errors = validate_request::<&str>(&sample_tasks(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyAssignees));
    }

    #[test]
    fn test_duplicate_assignee() {
        let errors = validate_request(&sample_tasks(), &["alice", "alice"]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateAssignee && e.message.contains("alice")));
    }

    #[test]
    fn test_blank_assignee() {
        let errors = validate_request(&sample_tasks(), &["alice", "  "]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::BlankAssignee));
    }

    #[test]
    fn test_missing_burned_points() {
        let tasks = vec![
            Task::new().with_burned_points(1.0),
            Task::new().with_attribute("expectedPoints", 2),
        ];
        let errors = validate_request(&tasks, &["alice"]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingBurnedPoints);
        assert!(errors[0].message.contains("Task 2"));
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![Task::new(), Task::new().with_attribute(BURNED_POINTS, "x")];
        let errors = validate_request::<&str>(&tasks, &[]).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_into_error_joins_messages() {
        let errors = validate_request(&[Task::new()], &["a", "a"]).unwrap_err();
        let err = into_error(errors);
        let text = err.to_string();
        assert!(text.contains("Duplicate assignee: a"));
        assert!(text.contains("Task 1"));
    }
}
