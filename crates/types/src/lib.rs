#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for poolgate
//!
//! This crate provides the small vocabulary shared by the pool, the driver
//! and the CLI: category identifiers, wake strategies and pool snapshots.

pub mod snapshot;

pub use snapshot::{CategoryUsage, InvariantViolation, PoolSnapshot};

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a resource category inside a pool
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category identifier
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Category name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CategoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// How parked clients are woken when capacity frees up
///
/// Both strategies broadcast to every parked client and rely on the
/// admission recheck loop; they differ only in the wake primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeStrategy {
    /// Native condition variable with `notify_all`
    Condvar,
    /// Counting semaphore plus an explicit waiter count, one token per waiter
    Semaphore,
}

impl Default for WakeStrategy {
    fn default() -> Self {
        Self::Condvar
    }
}

impl fmt::Display for WakeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condvar => write!(f, "condvar"),
            Self::Semaphore => write!(f, "semaphore"),
        }
    }
}

impl std::str::FromStr for WakeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "condvar" => Ok(Self::Condvar),
            "semaphore" => Ok(Self::Semaphore),
            other => Err(format!("unknown wake strategy: {other}")),
        }
    }
}

// Implement clap::ValueEnum for WakeStrategy
impl clap::ValueEnum for WakeStrategy {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Condvar, Self::Semaphore]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Condvar => clap::builder::PossibleValue::new("condvar"),
            Self::Semaphore => clap::builder::PossibleValue::new("semaphore"),
        })
    }
}

/// How a simulation picks the category each client requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Uniformly random category per client
    Random,
    /// Categories taken in configuration order, wrapping around
    RoundRobin,
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::Random
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::RoundRobin => write!(f, "round-robin"),
        }
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "round-robin" => Ok(Self::RoundRobin),
            other => Err(format!("unknown selection mode: {other}")),
        }
    }
}

impl clap::ValueEnum for SelectionMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Random, Self::RoundRobin]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Random => clap::builder::PossibleValue::new("random"),
            Self::RoundRobin => clap::builder::PossibleValue::new("round-robin"),
        })
    }
}
