//! Effort class model.
//!
//! Effort is recorded on completed tasks as a continuous "burned points"
//! value and bucketed into three ordinal classes. The buckets serve as the
//! classifier's training labels and as its prediction output.
//!
//! | Class | Burned points | Workload (days) |
//! |-------|---------------|-----------------|
//! | 1 | x <= 0.5 | 0 - 0.5 |
//! | 2 | 0.5 < x <= 2 | 0.5 - 2 |
//! | 3 | x > 2 | 2 - 3 |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AllotError;

/// Upper bound (inclusive) of burned points for [`EffortClass::Low`].
pub const LOW_EFFORT_MAX: f64 = 0.5;
/// Upper bound (inclusive) of burned points for [`EffortClass::Medium`].
pub const MEDIUM_EFFORT_MAX: f64 = 2.0;

/// One of three ordinal effort buckets.
///
/// Serialized as the plain integers `1`, `2`, `3`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum EffortClass {
    /// Class 1: up to half a point.
    Low = 1,
    /// Class 2: up to two points.
    Medium = 2,
    /// Class 3: more than two points.
    High = 3,
}

impl EffortClass {
    /// All classes in ordinal order.
    pub const ALL: [EffortClass; 3] = [Self::Low, Self::Medium, Self::High];

    /// Buckets a burned-points value.
    ///
    /// Boundary values (0.5, 2.0) map to the lower class.
    pub fn from_burned_points(burned_points: f64) -> Self {
        if burned_points <= LOW_EFFORT_MAX {
            Self::Low
        } else if burned_points <= MEDIUM_EFFORT_MAX {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Integer label (1, 2, or 3).
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Zero-based position, for per-class arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Inverse of [`EffortClass::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl TryFrom<u8> for EffortClass {
    type Error = AllotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(AllotError::InvalidInput(format!(
                "effort class must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<EffortClass> for u8 {
    fn from(class: EffortClass) -> Self {
        class.value()
    }
}

impl fmt::Display for EffortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
