//! Workload indicators for a completed distribution.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Min / Max workload | Sum of each task's class range bounds (days) |
//! | Avg workload | Sum of each task's adjusted cost (days) |
//! | Class counts | Tasks per predicted class |
//! | Imbalance | Largest minus smallest average workload |
//! | Mean workload | Mean average workload over assignees |

use super::CostModel;
use crate::models::{Distribution, EffortClass};

/// Range of days a task of a given class is expected to take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadRange {
    pub min_days: f64,
    pub max_days: f64,
}

impl WorkloadRange {
    /// Fixed range for each class: 0-0.5, 0.5-2, 2-3 days.
    pub fn for_class(class: EffortClass) -> Self {
        let (min_days, max_days) = match class {
            EffortClass::Low => (0.0, 0.5),
            EffortClass::Medium => (0.5, 2.0),
            EffortClass::High => (2.0, 3.0),
        };
        Self { min_days, max_days }
    }
}

/// Workload of one assignee.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeWorkload {
    pub assignee: String,
    /// Tasks in the assignee's queue.
    pub task_count: usize,
    /// Tasks per predicted class, indexed by `EffortClass::index()`.
    pub class_counts: [usize; 3],
    pub min_days: f64,
    pub avg_days: f64,
    pub max_days: f64,
}

/// Distribution performance indicators.
#[derive(Debug, Clone)]
pub struct WorkloadKpi {
    /// Per-assignee workload, in assignee order.
    pub by_assignee: Vec<AssigneeWorkload>,
    /// Total committed tasks.
    pub total_tasks: usize,
    /// Mean of `avg_days` across assignees.
    pub mean_workload_days: f64,
    /// Largest minus smallest `avg_days`.
    pub imbalance_days: f64,
}

impl WorkloadKpi {
    /// Computes KPIs from a distribution.
    ///
    /// Average workload uses `cost_model`, so it matches the loads the
    /// allocator balanced on.
    pub fn calculate(distribution: &Distribution, cost_model: &CostModel) -> Self {
        let by_assignee: Vec<AssigneeWorkload> = distribution
            .queues()
            .iter()
            .map(|queue| {
                let mut workload = AssigneeWorkload {
                    assignee: queue.assignee.clone(),
                    task_count: queue.tasks.len(),
                    class_counts: [0; 3],
                    min_days: 0.0,
                    avg_days: 0.0,
                    max_days: 0.0,
                };
                for task in &queue.tasks {
                    let class = task.best_class_estimated;
                    let range = WorkloadRange::for_class(class);
                    workload.class_counts[class.index()] += 1;
                    workload.min_days += range.min_days;
                    workload.max_days += range.max_days;
                    workload.avg_days += cost_model.cost(class);
                }
                workload
            })
            .collect();

        let (mean_workload_days, imbalance_days) = if by_assignee.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = by_assignee.iter().map(|w| w.avg_days).sum();
            let max = by_assignee
                .iter()
                .map(|w| w.avg_days)
                .fold(f64::NEG_INFINITY, f64::max);
            let min = by_assignee
                .iter()
                .map(|w| w.avg_days)
                .fold(f64::INFINITY, f64::min);
            (sum / by_assignee.len() as f64, max - min)
        };

        Self {
            total_tasks: distribution.task_count(),
            by_assignee,
            mean_workload_days,
            imbalance_days,
        }
    }

    /// Workload of one assignee.
    pub fn workload_of(&self, assignee: &str) -> Option<&AssigneeWorkload> {
        self.by_assignee.iter().find(|w| w.assignee == assignee)
    }
}
