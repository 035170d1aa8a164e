//! Cost model: predicted effort class → comparable numeric load.
//!
//! Classes are ordinal buckets of a continuous effort scale with uneven
//! widths (0-0.5, 0.5-2, 2+). Summing class indices would treat them as
//! equally spaced, so each class is mapped to a representative value on
//! the underlying scale instead.

use serde::{Deserialize, Serialize};

use crate::error::{AllotError, Result};
use crate::models::EffortClass;

/// Representative cost of each effort class.
///
/// Defaults: class 1 → 0.25, class 2 → 1.25, class 3 → 2.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Cost of class 1.
    pub low: f64,
    /// Cost of class 2.
    pub medium: f64,
    /// Cost of class 3.
    pub high: f64,
}

impl CostModel {
    /// Creates a cost model with explicit per-class costs.
    pub fn new(low: f64, medium: f64, high: f64) -> Self {
        Self { low, medium, high }
    }

    /// Adjusted cost of a predicted class.
    #[inline]
    pub fn cost(&self, class: EffortClass) -> f64 {
        match class {
            EffortClass::Low => self.low,
            EffortClass::Medium => self.medium,
            EffortClass::High => self.high,
        }
    }

    /// Costs must be finite, non-negative, and follow class order.
    pub fn validate(&self) -> Result<()> {
        let costs = [self.low, self.medium, self.high];
        if costs.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(AllotError::Config {
                message: format!("cost model values must be finite and >= 0, got {costs:?}"),
            });
        }
        if self.low > self.medium || self.medium > self.high {
            return Err(AllotError::Config {
                message: format!("cost model values must be non-decreasing by class, got {costs:?}"),
            });
        }
        Ok(())
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(0.25, 1.25, 2.5)
    }
}
