//! Resource pool error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PoolError {
    #[error("invalid category: {category}")]
    InvalidCategory { category: String },

    #[error("invalid capacity {capacity} for {category}: capacities must be positive")]
    InvalidCapacity { category: String, capacity: usize },

    #[error("pool has no categories configured")]
    NoCategories,
}

impl PoolError {
    /// Create an invalid category error
    pub fn invalid_category(category: impl Into<String>) -> Self {
        Self::InvalidCategory {
            category: category.into(),
        }
    }
}

impl UserFacingError for PoolError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCategory { .. } => {
                Some("Request one of the categories listed under [pool.categories].")
            }
            Self::InvalidCapacity { .. } => {
                Some("Set every capacity in the [pool] section to a value above zero.")
            }
            Self::NoCategories => Some("Add at least one entry under [pool.categories]."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidCategory { .. } => "pool.invalid_category",
            Self::InvalidCapacity { .. } => "pool.invalid_capacity",
            Self::NoCategories => "pool.no_categories",
        };
        Some(code)
    }
}
