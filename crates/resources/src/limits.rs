//! Pool capacity configuration
//!
//! This module defines the immutable capacity limits a pool is built with
//! and validates them once, up front.

use poolgate_errors::PoolError;
use poolgate_types::CategoryId;
use serde::Serialize;

/// Capacity limits of a resource pool
///
/// The global `total_capacity` and every category capacity must be
/// positive. Category capacities may add up to more than the total; the
/// global limit then binds first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolConfig {
    total_capacity: usize,
    /// Sorted by category id so lookups can binary search
    categories: Vec<(CategoryId, usize)>,
}

impl PoolConfig {
    /// Create and validate a pool configuration
    ///
    /// Duplicate categories keep the last capacity given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCapacity` if any capacity is zero and `NoCategories`
    /// if no category is given.
    pub fn new<I, C>(total_capacity: usize, categories: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (C, usize)>,
        C: Into<CategoryId>,
    {
        if total_capacity == 0 {
            return Err(PoolError::InvalidCapacity {
                category: "total".to_string(),
                capacity: 0,
            });
        }

        let mut entries: Vec<(CategoryId, usize)> = Vec::new();
        for (category, capacity) in categories {
            let category = category.into();
            if capacity == 0 {
                return Err(PoolError::InvalidCapacity {
                    category: category.to_string(),
                    capacity,
                });
            }
            match entries.binary_search_by(|(id, _)| id.cmp(&category)) {
                Ok(pos) => entries[pos].1 = capacity,
                Err(pos) => entries.insert(pos, (category, capacity)),
            }
        }

        if entries.is_empty() {
            return Err(PoolError::NoCategories);
        }

        Ok(Self {
            total_capacity,
            categories: entries,
        })
    }

    /// Small limits for tests: two slots shared by `a` (1) and `b` (2)
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            total_capacity: 2,
            categories: vec![(CategoryId::new("a"), 1), (CategoryId::new("b"), 2)],
        }
    }

    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.total_capacity
    }

    /// Capacity of `category`, if configured
    #[must_use]
    pub fn capacity(&self, category: &str) -> Option<usize> {
        self.slot(category).map(|slot| self.categories[slot].1)
    }

    /// Configured categories with their capacities, in id order
    pub fn categories(&self) -> impl Iterator<Item = (&CategoryId, usize)> + '_ {
        self.categories.iter().map(|(id, cap)| (id, *cap))
    }

    /// Configured category ids, in id order
    #[must_use]
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|(id, _)| id.clone()).collect()
    }

    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub(crate) fn slot(&self, category: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|(id, _)| id.as_str().cmp(category))
            .ok()
    }

    pub(crate) fn slot_capacity(&self, slot: usize) -> usize {
        self.categories[slot].1
    }

    pub(crate) fn slot_id(&self, slot: usize) -> &CategoryId {
        &self.categories[slot].0
    }
}

impl Default for PoolConfig {
    /// Twenty places shared by five bikes and eight scooters
    fn default() -> Self {
        Self {
            total_capacity: 20,
            categories: vec![(CategoryId::new("bike"), 5), (CategoryId::new("scooter"), 8)],
        }
    }
}
