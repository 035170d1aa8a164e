//! Effort classifiers.
//!
//! The allocator treats the classifier as an opaque capability: given a
//! feature row in schema order, return an effort class. [`BaggedTrees`] is
//! the persisted implementation; any `Fn(&[f64]) -> Result<EffortClass>`
//! closure also qualifies, which is how tests stub predictions.
//!
//! # Usage
//!
//! ```
//! use u_allot::classifier::EffortClassifier;
//! use u_allot::models::EffortClass;
//!
//! let always_medium = |_: &[f64]| -> u_allot::Result<EffortClass> { Ok(EffortClass::Medium) };
//! assert_eq!(always_medium.predict(&[0.0]).unwrap(), EffortClass::Medium);
//! ```

mod artifact;
mod ensemble;
mod tree;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use ensemble::BaggedTrees;
pub use tree::{ClassDistribution, DecisionTree, TreeNode};

use crate::error::Result;
use crate::models::EffortClass;

/// Predicts the effort class of a feature row.
///
/// Implementations must be deterministic for the allocator's output to be
/// reproducible.
pub trait EffortClassifier: Send + Sync {
    /// Predicts the class of one row.
    ///
    /// # Errors
    /// `SchemaMismatch` when the row width does not match what the model
    /// was trained on; `Prediction` for any other failure.
    fn predict(&self, features: &[f64]) -> Result<EffortClass>;
}

impl<F> EffortClassifier for F
where
    F: Fn(&[f64]) -> Result<EffortClass> + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> Result<EffortClass> {
        self(features)
    }
}
