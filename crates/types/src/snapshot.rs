//! Point-in-time views of pool occupancy
//!
//! A snapshot is copied out of the pool while its lock is held, so every
//! number in it belongs to the same instant.

use crate::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupancy of a single category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub category: CategoryId,
    pub capacity: usize,
    pub used: usize,
}

impl CategoryUsage {
    /// Units of this category that are still free, ignoring the global limit
    #[must_use]
    pub fn free(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }
}

/// Consistent copy of a pool's counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub total_capacity: usize,
    pub used_total: usize,
    /// Clients parked waiting for capacity at the time of the snapshot
    pub waiters: usize,
    pub categories: Vec<CategoryUsage>,
}

impl PoolSnapshot {
    /// Free units under the global limit
    #[must_use]
    pub fn available_total(&self) -> usize {
        self.total_capacity.saturating_sub(self.used_total)
    }

    /// Units a new request for `category` could take right now
    ///
    /// Returns `None` for categories the pool does not know.
    #[must_use]
    pub fn available(&self, category: &str) -> Option<usize> {
        self.usage(category)
            .map(|usage| usage.free().min(self.available_total()))
    }

    /// Usage entry for `category`, if configured
    #[must_use]
    pub fn usage(&self, category: &str) -> Option<&CategoryUsage> {
        self.categories
            .iter()
            .find(|usage| usage.category.as_str() == category)
    }

    /// True when nothing is held and nobody is waiting
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.used_total == 0
            && self.waiters == 0
            && self.categories.iter().all(|usage| usage.used == 0)
    }

    /// List every occupancy invariant this snapshot breaks
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        if self.used_total > self.total_capacity {
            violations.push(InvariantViolation::TotalOverCapacity {
                used: self.used_total,
                capacity: self.total_capacity,
            });
        }

        for usage in &self.categories {
            if usage.used > usage.capacity {
                violations.push(InvariantViolation::CategoryOverCapacity {
                    category: usage.category.clone(),
                    used: usage.used,
                    capacity: usage.capacity,
                });
            }
        }

        let sum: usize = self.categories.iter().map(|usage| usage.used).sum();
        if sum != self.used_total {
            violations.push(InvariantViolation::TotalMismatch {
                used_total: self.used_total,
                category_sum: sum,
            });
        }

        violations
    }
}

/// A broken occupancy invariant found in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    TotalOverCapacity {
        used: usize,
        capacity: usize,
    },
    CategoryOverCapacity {
        category: CategoryId,
        used: usize,
        capacity: usize,
    },
    TotalMismatch {
        used_total: usize,
        category_sum: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalOverCapacity { used, capacity } => {
                write!(f, "total usage {used} exceeds capacity {capacity}")
            }
            Self::CategoryOverCapacity {
                category,
                used,
                capacity,
            } => write!(
                f,
                "category {category} usage {used} exceeds capacity {capacity}"
            ),
            Self::TotalMismatch {
                used_total,
                category_sum,
            } => write!(
                f,
                "total usage {used_total} differs from category sum {category_sum}"
            ),
        }
    }
}
