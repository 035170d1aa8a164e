//! Distribution (solution) model.
//!
//! A distribution groups the assigned-task summaries under each assignee,
//! in the order tasks were committed, together with the running load each
//! assignee ended the pass with.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::EffortClass;

/// Summary of one task committed to an assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    /// Synthetic sequential title (`task1`, `task2`, ...).
    pub title: String,
    /// Class predicted for the winning assignee.
    pub best_class_estimated: EffortClass,
}

impl AssignedTask {
    /// Creates a summary for the task at 1-based position `sequence`.
    pub fn new(sequence: usize, best_class_estimated: EffortClass) -> Self {
        Self {
            title: format!("task{sequence}"),
            best_class_estimated,
        }
    }
}

/// The ordered task list and running load of one assignee.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeQueue {
    /// Assignee identifier.
    pub assignee: String,
    /// Committed tasks, in commit order.
    pub tasks: Vec<AssignedTask>,
    /// Sum of the adjusted costs of `tasks`.
    pub load: f64,
}

/// A complete assignment of tasks to assignees.
///
/// Serializes as a JSON object mapping each assignee to its task list.
/// Keys follow the caller's assignee order; assignees that received no
/// tasks map to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    queues: Vec<AssigneeQueue>,
}

impl Distribution {
    /// Creates an empty distribution over the given assignees.
    pub fn new<S: AsRef<str>>(assignees: &[S]) -> Self {
        Self {
            queues: assignees
                .iter()
                .map(|a| AssigneeQueue {
                    assignee: a.as_ref().to_string(),
                    tasks: Vec::new(),
                    load: 0.0,
                })
                .collect(),
        }
    }

    /// Appends a task to the queue at `index` and adds `cost` to its load.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub(crate) fn commit(&mut self, index: usize, task: AssignedTask, cost: f64) {
        let queue = &mut self.queues[index];
        queue.load += cost;
        queue.tasks.push(task);
    }

    /// Current load of the queue at `index`.
    pub(crate) fn load_at(&self, index: usize) -> f64 {
        self.queues[index].load
    }

    /// All queues, in assignee order.
    pub fn queues(&self) -> &[AssigneeQueue] {
        &self.queues
    }

    /// Tasks committed to `assignee`.
    pub fn tasks_for(&self, assignee: &str) -> Option<&[AssignedTask]> {
        self.queue(assignee).map(|q| q.tasks.as_slice())
    }

    /// Final running load of `assignee`.
    pub fn load_of(&self, assignee: &str) -> Option<f64> {
        self.queue(assignee).map(|q| q.load)
    }

    /// Assignee a task title was committed to.
    pub fn assignee_of(&self, title: &str) -> Option<&str> {
        self.queues
            .iter()
            .find(|q| q.tasks.iter().any(|t| t.title == title))
            .map(|q| q.assignee.as_str())
    }

    /// Number of assignees (including those with no tasks).
    pub fn assignee_count(&self) -> usize {
        self.queues.len()
    }

    /// Total number of committed tasks.
    pub fn task_count(&self) -> usize {
        self.queues.iter().map(|q| q.tasks.len()).sum()
    }

    fn queue(&self, assignee: &str) -> Option<&AssigneeQueue> {
        self.queues.iter().find(|q| q.assignee == assignee)
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.queues.len()))?;
        for queue in &self.queues {
            map.serialize_entry(&queue.assignee, &queue.tasks)?;
        }
        map.end()
    }
}
