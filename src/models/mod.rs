//! Allocation domain models.
//!
//! Provides the core data types for representing a distribution request
//! and its solution.
//!
//! # Domain Mappings
//!
//! | u-allot | Project tracking | Support desk |
//! |---------|------------------|--------------|
//! | Task | Issue | Ticket |
//! | Assignee | Developer | Agent |
//! | EffortClass | Story-point bucket | Severity tier |
//! | Distribution | Sprint plan | Shift queue |

mod distribution;
mod effort;
mod task;

pub use distribution::{AssignedTask, AssigneeQueue, Distribution};
pub use effort::{EffortClass, LOW_EFFORT_MAX, MEDIUM_EFFORT_MAX};
pub use task::{Task, ASSIGNEES, BURNED_POINTS, CLASS};
