#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for poolgate
//!
//! This crate provides error types organized by domain: the pool itself,
//! configuration loading and the simulation driver.
//! All error types implement Clone for easier handling.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod driver;
pub mod pool;

// Re-export all error types at the root
pub use config::ConfigError;
pub use driver::DriverError;
pub use pool::PoolError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(ConfigError::SerializeError {
            error: err.to_string(),
        })
    }
}

/// Result type alias for poolgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Pool(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Driver(err) => err.user_message(),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Pool(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Driver(err) => err.user_hint(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Pool(err) => err.is_retryable(),
            Error::Config(err) => err.is_retryable(),
            Error::Driver(err) => err.is_retryable(),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Pool(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Driver(err) => err.user_code(),
        }
    }
}
