#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for poolgate
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/poolgate/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod sections;

pub use sections::{PoolSection, SimulationConfig, MAX_CLIENTS};

use poolgate_errors::{ConfigError, DriverError, Error};
use poolgate_resources::PoolConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("poolgate").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not valid configuration TOML.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            debug!("no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file.
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // POOLGATE_TOTAL_CAPACITY
        if let Ok(total) = std::env::var("POOLGATE_TOTAL_CAPACITY") {
            self.pool.total_capacity = parse_env("POOLGATE_TOTAL_CAPACITY", total)?;
        }

        // POOLGATE_STRATEGY
        if let Ok(strategy) = std::env::var("POOLGATE_STRATEGY") {
            self.pool.strategy = parse_env("POOLGATE_STRATEGY", strategy)?;
        }

        // POOLGATE_CLIENTS
        if let Ok(clients) = std::env::var("POOLGATE_CLIENTS") {
            self.simulation.clients = parse_env("POOLGATE_CLIENTS", clients)?;
        }

        // POOLGATE_SEED
        if let Ok(seed) = std::env::var("POOLGATE_SEED") {
            self.simulation.seed = Some(parse_env("POOLGATE_SEED", seed)?);
        }

        // POOLGATE_MAX_HOLD_MS
        if let Ok(max_hold) = std::env::var("POOLGATE_MAX_HOLD_MS") {
            self.simulation.max_hold_ms = parse_env("POOLGATE_MAX_HOLD_MS", max_hold)?;
        }

        Ok(())
    }

    /// Check the settings that cannot be expressed in the TOML schema
    ///
    /// # Errors
    ///
    /// Returns an error if the pool capacities are invalid, the client count
    /// exceeds [`MAX_CLIENTS`] or the hold range is inverted.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pool.categories.is_empty() {
            return Err(ConfigError::MissingField {
                field: "categories".to_string(),
            }
            .into());
        }
        self.pool_config()?;

        if self.simulation.clients > MAX_CLIENTS {
            return Err(ConfigError::InvalidValue {
                field: "simulation.clients".to_string(),
                value: format!("{} (at most {MAX_CLIENTS})", self.simulation.clients),
            }
            .into());
        }

        if self.simulation.min_hold_ms > self.simulation.max_hold_ms {
            return Err(DriverError::InvalidHoldRange {
                min_ms: self.simulation.min_hold_ms,
                max_ms: self.simulation.max_hold_ms,
            }
            .into());
        }
        Ok(())
    }

    /// Build the validated pool limits described by the `[pool]` section
    ///
    /// # Errors
    ///
    /// Returns an error if any capacity is zero or no category is configured.
    pub fn pool_config(&self) -> Result<PoolConfig, Error> {
        PoolConfig::new(
            self.pool.total_capacity,
            self.pool
                .categories
                .iter()
                .map(|(name, &capacity)| (name.as_str(), capacity)),
        )
        .map_err(Into::into)
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String) -> Result<T, Error> {
    value.parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()
    })
}
