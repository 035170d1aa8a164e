//! Feature schema and per-assignee feature materialization.
//!
//! Assignee identifiers double as one-hot feature names: evaluating a task
//! for a candidate sets that candidate's column to 1 and leaves every other
//! column to the task's own data. Categorical fields are one-hot encoded
//! the same way at training and at evaluation.

mod categorical;
mod materialize;
mod schema;

pub use categorical::{category_of, encoded_columns, is_categorical, CATEGORICAL_FIELDS};
pub use materialize::{FeatureMaterializer, FeatureVector};
pub use schema::FeatureSchema;

pub(crate) use categorical::indicator;
pub(crate) use materialize::feature_value;
