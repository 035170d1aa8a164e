//! CART tree growth (Gini impurity, axis-aligned splits).
//!
//! # Algorithm
//!
//! Recursively, for the rows reaching a node:
//! 1. Stop with a leaf if the node is pure, `max_depth` is reached, or
//!    fewer than `min_samples_split` rows remain.
//! 2. For every feature, sort rows by value and scan the midpoints between
//!    distinct consecutive values; keep the split with the lowest weighted
//!    Gini impurity (first one found on ties).
//! 3. Split only if it lowers impurity; otherwise emit a leaf.
//!
//! # Complexity
//! O(f * n log n) per node where f=features, n=rows at the node.
//!
//! # Reference
//! Breiman et al. (1984), "Classification and Regression Trees"

use crate::classifier::{ClassDistribution, DecisionTree, TreeNode};
use crate::models::EffortClass;

const IMPURITY_EPSILON: f64 = 1e-12;

/// Tree growth limits.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

/// Grows a tree on the rows listed in `sample` (duplicates allowed).
pub fn grow(
    rows: &[Vec<f64>],
    labels: &[EffortClass],
    sample: &[usize],
    params: TreeParams,
) -> DecisionTree {
    let mut builder = Builder {
        rows,
        labels,
        params,
        nodes: Vec::new(),
    };
    if sample.is_empty() {
        return DecisionTree::leaf([1.0 / 3.0; 3]);
    }
    builder.build(sample.to_vec(), 0);
    DecisionTree::from_nodes(builder.nodes)
}

struct Builder<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [EffortClass],
    params: TreeParams,
    nodes: Vec<TreeNode>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl Builder<'_> {
    /// Builds the subtree for `indices` and returns its node index.
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let counts = self.counts(&indices);
        let impurity = gini(&counts, indices.len());
        let node = self.nodes.len();

        let can_split = depth < self.params.max_depth
            && indices.len() >= self.params.min_samples_split.max(2)
            && impurity > IMPURITY_EPSILON;

        let split = if can_split {
            self.best_split(&indices)
                .filter(|s| s.impurity < impurity - IMPURITY_EPSILON)
        } else {
            None
        };

        let Some(split) = split else {
            self.nodes.push(TreeNode::Leaf {
                distribution: distribution(&counts, indices.len()),
            });
            return node;
        };

        // Reserve the slot so children get larger indices than the parent.
        self.nodes.push(TreeNode::Leaf {
            distribution: [0.0; 3],
        });
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[node] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }

    fn best_split(&self, indices: &[usize]) -> Option<Split> {
        let n_features = self.rows.first().map_or(0, Vec::len);
        let total = self.counts(indices);
        let n = indices.len();
        let mut best: Option<Split> = None;

        for feature in 0..n_features {
            let mut sorted: Vec<(f64, EffortClass)> = indices
                .iter()
                .map(|&i| (self.rows[i][feature], self.labels[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = [0usize; 3];
            for k in 0..n - 1 {
                left[sorted[k].1.index()] += 1;
                let (here, next) = (sorted[k].0, sorted[k + 1].0);
                if here == next {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                let right = [total[0] - left[0], total[1] - left[1], total[2] - left[2]];
                let weighted = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best
                    .as_ref()
                    .map_or(true, |b| weighted < b.impurity - IMPURITY_EPSILON)
                {
                    best = Some(Split {
                        feature,
                        threshold: midpoint(here, next),
                        impurity: weighted,
                    });
                }
            }
        }
        best
    }

    fn counts(&self, indices: &[usize]) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for &i in indices {
            counts[self.labels[i].index()] += 1;
        }
        counts
    }
}

fn gini(counts: &[usize; 3], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn distribution(counts: &[usize; 3], n: usize) -> ClassDistribution {
    let n = n.max(1) as f64;
    counts.map(|c| c as f64 / n)
}

/// Threshold between two distinct sorted values that keeps `low` on the left
/// and `high` on the right.
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low + (high - low) / 2.0;
    if mid < high {
        mid
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{BaggedTrees, EffortClassifier};

    const PARAMS: TreeParams = TreeParams {
        max_depth: 7,
        min_samples_split: 2,
    };

    fn separable() -> (Vec<Vec<f64>>, Vec<EffortClass>) {
        let rows = vec![
            vec![0.0, 5.0],
            vec![1.0, 3.0],
            vec![2.0, 9.0],
            vec![3.0, 1.0],
            vec![4.0, 4.0],
            vec![5.0, 2.0],
        ];
        let labels = vec![
            EffortClass::Low,
            EffortClass::Low,
            EffortClass::Medium,
            EffortClass::Medium,
            EffortClass::High,
            EffortClass::High,
        ];
        (rows, labels)
    }

    #[test]
    fn test_fits_separable_data() {
        let (rows, labels) = separable();
        let sample: Vec<usize> = (0..rows.len()).collect();
        let tree = grow(&rows, &labels, &sample, PARAMS);

        assert!(tree.validate(2).is_ok());
        let model = BaggedTrees::new(2, vec![tree]).unwrap();
        for (row, label) in rows.iter().zip(&labels) {
            assert_eq!(model.predict(row).unwrap(), *label);
        }
    }

    #[test]
    fn test_depth_limit() {
        let (rows, labels) = separable();
        let sample: Vec<usize> = (0..rows.len()).collect();
        let stump = grow(
            &rows,
            &labels,
            &sample,
            TreeParams {
                max_depth: 1,
                min_samples_split: 2,
            },
        );
        assert_eq!(stump.depth(), 1);
        assert_eq!(stump.node_count(), 3);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let rows = vec![vec![0.0], vec![1.0]];
        let labels = vec![EffortClass::Medium, EffortClass::Medium];
        let tree = grow(&rows, &labels, &[0, 1], PARAMS);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(&[0.5]).unwrap(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_identical_features_cannot_split() {
        let rows = vec![vec![1.0], vec![1.0], vec![1.0]];
        let labels = vec![EffortClass::Low, EffortClass::High, EffortClass::High];
        let tree = grow(&rows, &labels, &[0, 1, 2], PARAMS);
        assert_eq!(tree.node_count(), 1);
        let proba = tree.predict_proba(&[1.0]).unwrap();
        assert!((proba[2] - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_duplicated_sample_rows_weigh_more() {
        let rows = vec![vec![0.0], vec![0.0]];
        let labels = vec![EffortClass::Low, EffortClass::High];
        let tree = grow(&rows, &labels, &[0, 1, 1, 1], PARAMS);
        assert_eq!(tree.predict_proba(&[0.0]).unwrap(), [0.25, 0.0, 0.75]);
    }

    #[test]
    fn test_midpoint_keeps_order() {
        assert_eq!(midpoint(1.0, 2.0), 1.5);
        let low: f64 = 1.0;
        let high = f64::from_bits(low.to_bits() + 1);
        let t = midpoint(low, high);
        assert!(low <= t && t < high);
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0, 0], 4), 0.0);
        assert!((gini(&[1, 1, 0], 2) - 0.5).abs() < 1e-12);
    }
}
