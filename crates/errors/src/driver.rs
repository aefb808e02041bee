//! Simulation driver error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum DriverError {
    #[error("client {client} panicked: {message}")]
    ClientPanicked { client: usize, message: String },

    #[error("no categories to choose from")]
    NoCategories,

    #[error("invalid hold range: min {min_ms}ms exceeds max {max_ms}ms")]
    InvalidHoldRange { min_ms: u64, max_ms: u64 },
}

impl UserFacingError for DriverError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidHoldRange { .. } => {
                Some("Make min_hold_ms less than or equal to max_hold_ms.")
            }
            Self::NoCategories => Some("Configure at least one pool category."),
            Self::ClientPanicked { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ClientPanicked { .. } => "driver.client_panicked",
            Self::NoCategories => "driver.no_categories",
            Self::InvalidHoldRange { .. } => "driver.invalid_hold_range",
        };
        Some(code)
    }
}
