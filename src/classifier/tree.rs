//! Binary decision tree over numeric features.
//!
//! Nodes are stored in a flat array with the root at index 0. A split sends
//! a row left when `features[feature] <= threshold`. Leaves hold the class
//! distribution (fractions for classes 1, 2, 3) of the training rows that
//! reached them.

use serde::{Deserialize, Serialize};

use crate::error::{AllotError, Result};

/// Per-class probabilities, indexed by `EffortClass::index()`.
pub type ClassDistribution = [f64; 3];

/// A tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal test on one feature.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal class distribution.
    Leaf { distribution: ClassDistribution },
}

/// A CART-style classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Builds a tree from its flat node array.
    ///
    /// Call [`DecisionTree::validate`] before predicting on untrusted input.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// A single-leaf tree.
    pub fn leaf(distribution: ClassDistribution) -> Self {
        Self::from_nodes(vec![TreeNode::Leaf { distribution }])
    }

    /// Flat node array (root first).
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks structural integrity against a feature width.
    ///
    /// Children must point strictly forward, which rules out cycles and
    /// guarantees traversal terminates.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AllotError::SchemaMismatch("decision tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(AllotError::SchemaMismatch(format!(
                            "node {idx} splits on feature {feature}, but only {n_features} features exist"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(AllotError::SchemaMismatch(format!(
                            "node {idx} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(AllotError::SchemaMismatch(format!(
                                "node {idx} has invalid child index {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { distribution } => {
                    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(AllotError::SchemaMismatch(format!(
                            "leaf {idx} has an invalid class distribution"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Class distribution of the leaf a row falls into.
    ///
    /// Traversal only moves to higher node indices, so it terminates on
    /// any node array.
    ///
    /// # Errors
    /// `SchemaMismatch` if a split reads past `features` or points at a
    /// missing or earlier node.
    pub fn predict_proba(&self, features: &[f64]) -> Result<ClassDistribution> {
        let mut idx = 0;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| {
                AllotError::SchemaMismatch(format!("decision tree has no node {idx}"))
            })?;
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).ok_or_else(|| {
                        AllotError::SchemaMismatch(format!(
                            "node {idx} splits on feature {feature}, but the row has {} features",
                            features.len()
                        ))
                    })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next <= idx {
                        return Err(AllotError::SchemaMismatch(format!(
                            "node {idx} has invalid child index {next}"
                        )));
                    }
                    idx = next;
                }
                TreeNode::Leaf { distribution } => return Ok(*distribution),
            }
        }
    }

    /// Longest root-to-leaf path, in edges. Malformed links end a path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(TreeNode::Split { left, right, .. }) => {
                    let below = [*left, *right]
                        .into_iter()
                        .filter(|&child| child > idx)
                        .map(|child| walk(nodes, child))
                        .max()
                        .unwrap_or(0);
                    1 + below
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}
