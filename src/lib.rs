//! Load-aware task allocation driven by a learned effort classifier.
//!
//! Assigns each task to the assignee who would finish it with the least
//! resulting workload, using a classifier that predicts how much effort a
//! given assignee needs for a given task.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `EffortClass`, `AssignedTask`,
//!   `Distribution`
//! - **`features`**: `FeatureSchema` and per-candidate feature vectors
//! - **`classifier`**: `EffortClassifier` trait, bagged decision trees,
//!   persisted `ModelArtifact`
//! - **`allocation`**: `GreedyAllocator`, `CostModel`, `WorkloadKpi`
//! - **`training`**: dataset construction and CART bagging
//! - **`store`**: artifact storage with explicit readiness
//! - **`service`**: request handling with status mapping
//! - **`config`**: TOML configuration with environment overrides
//! - **`validation`**: input integrity checks (assignees, burned points)
//!
//! # Example
//!
//! ```
//! use u_allot::allocation::GreedyAllocator;
//! use u_allot::features::FeatureSchema;
//! use u_allot::models::{EffortClass, Task};
//!
//! let schema = FeatureSchema::new(["alice", "bob"]).unwrap();
//! let classifier = |features: &[f64]| -> u_allot::Result<EffortClass> {
//!     Ok(if features[0] == 1.0 { EffortClass::Low } else { EffortClass::High })
//! };
//! let allocator = GreedyAllocator::new(&classifier, &schema);
//!
//! let mut tasks = vec![Task::new().with_burned_points(1.0)];
//! let distribution = allocator.distribute(&mut tasks, &["bob", "alice"]).unwrap();
//! assert_eq!(distribution.assignee_of("task1"), Some("alice"));
//! ```
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Breiman (1996), "Bagging Predictors"
//! - Breiman et al. (1984), "Classification and Regression Trees"

pub mod allocation;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod service;
pub mod store;
pub mod training;
pub mod validation;

pub use error::{AllotError, Result};
