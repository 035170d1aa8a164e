//! Greedy task allocation and workload metrics.
//!
//! Provides the load-balancing allocator, the class-to-cost model it
//! balances on, and workload indicators over its result.
//!
//! # Algorithm
//!
//! `GreedyAllocator` evaluates every (task, assignee) pair through the
//! classifier and places each task, in input order, on the assignee whose
//! running load plus the task's predicted cost is smallest. It is a single
//! forward pass without backtracking; not optimal, but load-aware.
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5

mod cost;
mod greedy;
mod kpi;

pub use cost::CostModel;
pub use greedy::{Evaluation, GreedyAllocator};
pub use kpi::{AssigneeWorkload, WorkloadKpi, WorkloadRange};
