//! Classifier training.
//!
//! Builds a labelled dataset from historical task records and fits a
//! bagged ensemble of CART trees on it. One fixed configuration is trained
//! once; there is no model search.
//!
//! # Pipeline
//!
//! 1. Label, filter, and one-hot encode records ([`Dataset::from_records`])
//! 2. Balance classes by downsampling ([`Dataset::balance`])
//! 3. Fit `n_estimators` trees, each on a bootstrap sample
//! 4. Package model and column names as a [`ModelArtifact`]

mod cart;
mod dataset;

pub use cart::TreeParams;
pub use dataset::Dataset;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{BaggedTrees, EffortClassifier, ModelArtifact};
use crate::error::{AllotError, Result};
use crate::features::FeatureSchema;
use crate::models::Task;

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of bagged trees.
    pub n_estimators: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum rows at a node to consider splitting.
    pub min_samples_split: usize,
    /// Records with more burned points than this are dropped.
    pub max_burned_points: f64,
    /// Downsample classes to equal size before fitting.
    pub balance: bool,
    /// RNG seed for balancing and bootstrap sampling.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 7,
            min_samples_split: 2,
            max_burned_points: 10.0,
            balance: true,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    /// Rejects configurations that cannot produce a model.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(AllotError::Config {
                message: "training.n_estimators must be > 0".into(),
            });
        }
        if !self.max_burned_points.is_finite() {
            return Err(AllotError::Config {
                message: "training.max_burned_points must be finite".into(),
            });
        }
        Ok(())
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Records supplied.
    pub records: usize,
    /// Rows the trees were fitted on (after filtering and balancing).
    pub samples: usize,
    /// Feature columns in the schema.
    pub features: usize,
    /// Rows per class after balancing, for classes 1, 2, 3.
    pub class_counts: [usize; 3],
    /// Number of trees.
    pub trees: usize,
    /// Depth of the deepest tree.
    pub max_tree_depth: usize,
    /// Fraction of fitted rows the ensemble labels correctly.
    pub training_accuracy: f64,
}

/// Trains a classifier artifact from historical task records.
///
/// # Errors
/// - `Config` for invalid hyperparameters.
/// - `InvalidInput` when records lack burned points or none survive
///   filtering.
pub fn train(records: &[Task], config: &TrainingConfig) -> Result<(ModelArtifact, TrainingReport)> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut dataset = Dataset::from_records(records, config.max_burned_points)?;
    if config.balance {
        dataset = dataset.balance(&mut rng);
    }
    info!(
        records = records.len(),
        samples = dataset.len(),
        features = dataset.columns.len(),
        "training effort classifier"
    );

    let params = TreeParams {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
    };
    let n = dataset.len();
    let trees = (0..config.n_estimators)
        .map(|_| {
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            cart::grow(&dataset.rows, &dataset.labels, &sample, params)
        })
        .collect();

    let model = BaggedTrees::new(dataset.columns.len(), trees)?;
    let schema = FeatureSchema::new(dataset.columns.iter().cloned())?;
    let artifact = ModelArtifact::new(model, schema)?;

    let mut correct = 0;
    for (row, label) in dataset.rows.iter().zip(&dataset.labels) {
        if artifact.classifier().predict(row)? == *label {
            correct += 1;
        }
    }
    let report = TrainingReport {
        records: records.len(),
        samples: n,
        features: dataset.columns.len(),
        class_counts: dataset.class_counts(),
        trees: artifact.classifier().tree_count(),
        max_tree_depth: artifact
            .classifier()
            .trees()
            .iter()
            .map(|tree| tree.depth())
            .max()
            .unwrap_or(0),
        training_accuracy: correct as f64 / n.max(1) as f64,
    };
    info!(
        accuracy = report.training_accuracy,
        trees = report.trees,
        max_depth = report.max_tree_depth,
        "training complete"
    );
    Ok((artifact, report))
}
