//! Greedy load-balancing allocator.
//!
//! # Algorithm
//!
//! 1. Validate the request (assignees, burned points).
//! 2. For each task, in input order, evaluate every assignee in caller
//!    order: materialize features, predict the class, convert to cost, and
//!    compute `candidate_total = load[assignee] + cost`.
//! 3. Select the strictly smallest `candidate_total`; ties go to the
//!    earliest assignee.
//! 4. Commit the winner's cost, captured at selection, to its load and
//!    record `task<N>` with the winner's predicted class.
//! 5. After every task is placed, tag each task's `class` with the class
//!    derived from its own burned points.
//!
//! Any failure aborts the call before tasks are tagged.
//!
//! # Complexity
//! O(n * a * f) where n=tasks, a=assignees, f=schema width.
//!
//! # Reference
//! Graham (1969), "Bounds on Multiprocessing Timing Anomalies" (list scheduling)

use tracing::{debug, info, warn};

use super::CostModel;
use crate::classifier::{EffortClassifier, ModelArtifact};
use crate::error::{AllotError, Result};
use crate::features::{FeatureMaterializer, FeatureSchema};
use crate::models::{AssignedTask, Distribution, EffortClass, Task};
use crate::validation;

/// One assignee's evaluation of one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Predicted effort class.
    pub class: EffortClass,
    /// Adjusted cost of `class`.
    pub cost: f64,
}

/// Greedy allocator over an injected classifier.
///
/// # Example
///
/// ```
/// use u_allot::allocation::GreedyAllocator;
/// use u_allot::features::FeatureSchema;
/// use u_allot::models::{EffortClass, Task};
///
/// let schema = FeatureSchema::new(["alice", "bob"]).unwrap();
/// let classifier = |_: &[f64]| -> u_allot::Result<EffortClass> { Ok(EffortClass::Medium) };
/// let allocator = GreedyAllocator::new(&classifier, &schema);
///
/// let mut tasks = vec![Task::new().with_burned_points(1.0); 3];
/// let distribution = allocator.distribute(&mut tasks, &["alice", "bob"]).unwrap();
/// assert_eq!(distribution.tasks_for("alice").unwrap().len(), 2);
/// assert_eq!(distribution.tasks_for("bob").unwrap().len(), 1);
/// ```
#[derive(Clone, Copy)]
pub struct GreedyAllocator<'a> {
    classifier: &'a dyn EffortClassifier,
    materializer: FeatureMaterializer<'a>,
    cost_model: CostModel,
}

impl<'a> GreedyAllocator<'a> {
    /// Creates an allocator with the default cost model.
    pub fn new(classifier: &'a dyn EffortClassifier, schema: &'a FeatureSchema) -> Self {
        Self {
            classifier,
            materializer: FeatureMaterializer::new(schema),
            cost_model: CostModel::default(),
        }
    }

    /// Creates an allocator over a loaded artifact.
    pub fn from_artifact(artifact: &'a ModelArtifact) -> Self {
        Self::new(artifact.classifier(), artifact.schema())
    }

    /// Sets the cost model.
    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// The cost model in use.
    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Evaluates `task` as if assigned to `assignee`.
    pub fn evaluate(&self, task: &Task, assignee: &str) -> Result<Evaluation> {
        let features = self.materializer.materialize(task, assignee)?;
        let class = self.classifier.predict(&features)?;
        Ok(Evaluation {
            class,
            cost: self.cost_model.cost(class),
        })
    }

    /// Distributes `tasks` across `assignees`.
    ///
    /// On success every task carries a `class` attribute and appears in
    /// exactly one assignee's list. On failure no task is modified.
    ///
    /// # Errors
    /// - `InvalidInput` for empty/duplicate/blank assignees or missing
    ///   burned points.
    /// - `SchemaMismatch` / `Prediction` from feature materialization or
    ///   the classifier, annotated with the task and assignee.
    pub fn distribute<S: AsRef<str>>(
        &self,
        tasks: &mut [Task],
        assignees: &[S],
    ) -> Result<Distribution> {
        validation::validate_request(tasks, assignees).map_err(validation::into_error)?;

        let schema = self.materializer.schema();
        for assignee in assignees {
            if !schema.contains(assignee.as_ref()) {
                warn!(
                    assignee = assignee.as_ref(),
                    "assignee has no feature column; predictions ignore who is assigned"
                );
            }
        }

        info!(
            tasks = tasks.len(),
            assignees = assignees.len(),
            "distributing tasks"
        );

        let mut distribution = Distribution::new(assignees);
        for (i, task) in tasks.iter().enumerate() {
            let sequence = i + 1;
            let mut best: Option<(usize, f64, Evaluation)> = None;

            for (j, assignee) in assignees.iter().enumerate() {
                let assignee = assignee.as_ref();
                let evaluation = self
                    .evaluate(task, assignee)
                    .map_err(|e| with_context(e, sequence, assignee))?;
                let total = distribution.load_at(j) + evaluation.cost;
                if best.map_or(true, |(_, best_total, _)| total < best_total) {
                    best = Some((j, total, evaluation));
                }
            }

            let (winner, total, evaluation) = best.ok_or_else(|| {
                AllotError::InvalidInput("At least one assignee is required".into())
            })?;
            distribution.commit(
                winner,
                AssignedTask::new(sequence, evaluation.class),
                evaluation.cost,
            );
            debug!(
                task = sequence,
                assignee = assignees[winner].as_ref(),
                class = evaluation.class.value(),
                load = total,
                "task committed"
            );
        }

        for task in tasks.iter_mut() {
            if let Some(class) = task.derived_class() {
                task.set_class(class);
            }
        }

        info!(tasks = distribution.task_count(), "distribution complete");
        Ok(distribution)
    }
}

impl std::fmt::Debug for GreedyAllocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreedyAllocator")
            .field("schema_width", &self.materializer.schema().len())
            .field("cost_model", &self.cost_model)
            .finish()
    }
}

fn with_context(err: AllotError, sequence: usize, assignee: &str) -> AllotError {
    match err {
        AllotError::SchemaMismatch(msg) => {
            AllotError::SchemaMismatch(format!("task{sequence} for '{assignee}': {msg}"))
        }
        AllotError::Prediction(msg) => {
            AllotError::Prediction(format!("task{sequence} for '{assignee}': {msg}"))
        }
        other => other,
    }
}
