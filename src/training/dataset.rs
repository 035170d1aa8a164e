//! Training dataset construction.
//!
//! Turns task records into a dense numeric matrix:
//! - label: effort class derived from burned points
//! - columns: numeric and boolean attributes, one `<field>_<category>`
//!   column per categorical value seen, plus one indicator column per
//!   historical assignee (multi-label one-hot)
//! - columns sorted by name; absent values are 0
//! - columns that are zero for every row are dropped

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::{AllotError, Result};
use crate::features::{encoded_columns, feature_value, indicator, is_categorical};
use crate::models::{EffortClass, Task, ASSIGNEES, BURNED_POINTS, CLASS};
use crate::validation;

/// A labelled numeric dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column names, in row order.
    pub columns: Vec<String>,
    /// Feature rows.
    pub rows: Vec<Vec<f64>>,
    /// One label per row.
    pub labels: Vec<EffortClass>,
}

impl Dataset {
    /// Builds a dataset from training records.
    ///
    /// Records without assignees or with burned points above
    /// `max_burned_points` are dropped as outliers.
    ///
    /// # Errors
    /// - `InvalidInput` if any record lacks numeric burned points, or no
    ///   record survives filtering.
    pub fn from_records(records: &[Task], max_burned_points: f64) -> Result<Self> {
        validation::validate_tasks(records).map_err(validation::into_error)?;

        let kept: Vec<&Task> = records
            .iter()
            .filter(|r| !r.assignees().is_empty())
            .filter(|r| r.burned_points().is_some_and(|p| p <= max_burned_points))
            .collect();
        if kept.is_empty() {
            return Err(AllotError::InvalidInput(
                "no usable training records after filtering".into(),
            ));
        }

        let mut names = BTreeSet::new();
        for record in &kept {
            for (key, value) in &record.attributes {
                if is_reserved(key) {
                    continue;
                }
                if matches!(value, Value::Number(_) | Value::Bool(_)) {
                    names.insert(key.clone());
                }
            }
            names.extend(encoded_columns(record));
            for assignee in record.assignees() {
                names.insert(assignee.to_string());
            }
        }
        let columns: Vec<String> = names.into_iter().collect();

        let mut rows = Vec::with_capacity(kept.len());
        let mut labels = Vec::with_capacity(kept.len());
        for record in &kept {
            let assignees = record.assignees();
            let row: Vec<f64> = columns
                .iter()
                .map(|column| {
                    if assignees.contains(&column.as_str()) {
                        1.0
                    } else {
                        record
                            .get(column)
                            .and_then(feature_value)
                            .or_else(|| indicator(record, column))
                            .unwrap_or(0.0)
                    }
                })
                .collect();
            rows.push(row);
            labels.push(record.derived_class().unwrap_or(EffortClass::High));
        }

        let mut dataset = Self {
            columns,
            rows,
            labels,
        };
        dataset.drop_zero_columns();
        Ok(dataset)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows per class, indexed by `EffortClass::index()`.
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Downsamples every present class to the size of the smallest one.
    ///
    /// Kept rows retain their original relative order.
    pub fn balance<R: Rng>(&self, rng: &mut R) -> Self {
        let mut by_class: [Vec<usize>; 3] = Default::default();
        for (i, label) in self.labels.iter().enumerate() {
            by_class[label.index()].push(i);
        }
        let target = by_class
            .iter()
            .filter(|group| !group.is_empty())
            .map(Vec::len)
            .min()
            .unwrap_or(0);

        let mut keep = Vec::with_capacity(target * 3);
        for group in &mut by_class {
            group.shuffle(rng);
            keep.extend(group.iter().take(target).copied());
        }
        keep.sort_unstable();

        Self {
            columns: self.columns.clone(),
            rows: keep.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: keep.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    fn drop_zero_columns(&mut self) {
        let live: Vec<bool> = (0..self.columns.len())
            .map(|c| self.rows.iter().any(|row| row[c] != 0.0))
            .collect();
        if live.iter().all(|&l| l) {
            return;
        }
        self.columns = self
            .columns
            .iter()
            .zip(&live)
            .filter(|(_, l)| **l)
            .map(|(name, _)| name.clone())
            .collect();
        for row in &mut self.rows {
            *row = row
                .iter()
                .zip(&live)
                .filter(|(_, l)| **l)
                .map(|(v, _)| *v)
                .collect();
        }
    }
}

fn is_reserved(key: &str) -> bool {
    key == BURNED_POINTS || key == CLASS || key == ASSIGNEES || is_categorical(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(points: f64, assignees: &[&str]) -> Task {
        Task::new()
            .with_burned_points(points)
            .with_assignees(assignees.iter().copied())
    }

    #[test]
    fn test_columns_and_one_hot() {
        let records = vec![
            record(0.2, &["bob"]).with_attribute("expectedPoints", 1),
            record(1.0, &["alice", "bob"]).with_attribute("hasPr", true),
            record(3.0, &["alice"]).with_attribute("title", "text is skipped"),
        ];
        let ds = Dataset::from_records(&records, 10.0).unwrap();

        assert_eq!(ds.columns, ["alice", "bob", "expectedPoints", "hasPr"]);
        assert_eq!(ds.rows[0], vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(ds.rows[1], vec![1.0, 1.0, 0.0, 1.0]);
        assert_eq!(ds.rows[2], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            ds.labels,
            [EffortClass::Low, EffortClass::Medium, EffortClass::High]
        );
    }

    #[test]
    fn test_categorical_fields_one_hot() {
        let records = vec![
            record(0.2, &["alice"]).with_attribute("labels", serde_json::json!(["docs"])),
            record(3.0, &["alice"]).with_attribute("labels", serde_json::json!(["ui", "bug"])),
            record(0.3, &["alice"]).with_attribute("categories", "backend"),
        ];
        let ds = Dataset::from_records(&records, 10.0).unwrap();

        assert_eq!(
            ds.columns,
            ["alice", "categories_backend", "labels_bug,ui", "labels_docs"]
        );
        assert_eq!(ds.rows[0], vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(ds.rows[1], vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(ds.rows[2], vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_outliers_filtered() {
        let records = vec![
            record(0.2, &["bob"]),
            record(12.0, &["bob"]),
            record(1.0, &[]),
        ];
        let ds = Dataset::from_records(&records, 10.0).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.class_counts(), [1, 0, 0]);
    }

    #[test]
    fn test_zero_columns_dropped() {
        let records = vec![
            record(0.2, &["bob"]).with_attribute("flag", 0),
            record(3.0, &["bob"]).with_attribute("flag", false),
        ];
        let ds = Dataset::from_records(&records, 10.0).unwrap();
        assert_eq!(ds.columns, ["bob"]);
        assert!(ds.rows.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_reserved_columns_excluded() {
        let records = vec![record(0.2, &["bob"]).with_attribute(CLASS, 1)];
        let ds = Dataset::from_records(&records, 10.0).unwrap();
        assert_eq!(ds.columns, ["bob"]);
    }

    #[test]
    fn test_nothing_usable() {
        let err = Dataset::from_records(&[record(50.0, &["bob"])], 10.0).unwrap_err();
        assert!(matches!(err, AllotError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_burned_points_rejected() {
        let records = vec![Task::new().with_assignees(["bob"])];
        assert!(Dataset::from_records(&records, 10.0).is_err());
    }

    #[test]
    fn test_balance_downsamples() {
        let mut records = Vec::new();
        for _ in 0..6 {
            records.push(record(0.1, &["a"]));
        }
        for _ in 0..2 {
            records.push(record(1.0, &["a"]));
        }
        for _ in 0..4 {
            records.push(record(5.0, &["a"]));
        }
        let ds = Dataset::from_records(&records, 10.0).unwrap();
        assert_eq!(ds.class_counts(), [6, 2, 4]);

        let mut rng = StdRng::seed_from_u64(7);
        let balanced = ds.balance(&mut rng);
        assert_eq!(balanced.class_counts(), [2, 2, 2]);
        assert_eq!(balanced.columns, ds.columns);
    }

    #[test]
    fn test_balance_ignores_absent_classes() {
        let records = vec![
            record(0.1, &["a"]),
            record(0.1, &["a"]),
            record(5.0, &["a"]),
        ];
        let ds = Dataset::from_records(&records, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ds.balance(&mut rng).class_counts(), [1, 0, 1]);
    }
}
