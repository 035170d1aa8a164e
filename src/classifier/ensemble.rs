//! Bagged decision-tree ensemble.
//!
//! Each tree votes with its leaf class distribution; the ensemble averages
//! the distributions and predicts the most probable class. Equal
//! probabilities resolve to the lower class.
//!
//! # Reference
//! Breiman (1996), "Bagging Predictors", Machine Learning 24(2)

use serde::{Deserialize, Serialize};

use super::tree::{ClassDistribution, DecisionTree};
use super::EffortClassifier;
use crate::error::{AllotError, Result};
use crate::models::EffortClass;

/// A bootstrap-aggregated tree ensemble.
///
/// Deserialization validates the ensemble like [`BaggedTrees::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleData")]
pub struct BaggedTrees {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

#[derive(Deserialize)]
struct EnsembleData {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<EnsembleData> for BaggedTrees {
    type Error = AllotError;

    fn try_from(data: EnsembleData) -> Result<Self> {
        Self::new(data.n_features, data.trees)
    }
}

impl BaggedTrees {
    /// Builds and validates an ensemble.
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Result<Self> {
        let ensemble = Self { n_features, trees };
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Checks that the ensemble is non-empty and every tree fits the width.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(AllotError::SchemaMismatch("ensemble has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| match e {
                AllotError::SchemaMismatch(msg) => {
                    AllotError::SchemaMismatch(format!("tree {i}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Expected feature-vector width.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of trees.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// The member trees.
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean class distribution across trees.
    pub fn predict_proba(&self, features: &[f64]) -> Result<ClassDistribution> {
        if features.len() != self.n_features {
            return Err(AllotError::SchemaMismatch(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let mut sum = [0.0; 3];
        for tree in &self.trees {
            let proba = tree.predict_proba(features)?;
            for (acc, p) in sum.iter_mut().zip(proba) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(sum.map(|s| s / n))
    }
}

impl EffortClassifier for BaggedTrees {
    fn predict(&self, features: &[f64]) -> Result<EffortClass> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = i;
            }
        }
        EffortClass::from_index(best)
            .ok_or_else(|| AllotError::Prediction(format!("class index {best} out of range")))
    }
}
