//! Configuration sections shared by the CLI and the driver

use poolgate_types::{SelectionMode, WakeStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool capacity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSection {
    #[serde(default = "default_total_capacity")]
    pub total_capacity: usize,
    #[serde(default)]
    pub strategy: WakeStrategy,
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, usize>,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            total_capacity: default_total_capacity(),
            strategy: WakeStrategy::Condvar,
            categories: default_categories(),
        }
    }
}

/// Upper bound on `simulation.clients`; every client runs on its own OS thread
pub const MAX_CLIENTS: usize = 4096;

/// Simulation driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_clients")]
    pub clients: usize,
    #[serde(default)]
    pub selection: SelectionMode,
    /// Fixed seed for reproducible runs; random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub min_hold_ms: u64,
    #[serde(default = "default_max_hold_ms")]
    pub max_hold_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clients: default_clients(),
            selection: SelectionMode::Random,
            seed: None,
            min_hold_ms: 0,
            max_hold_ms: default_max_hold_ms(),
        }
    }
}

// Default value functions for serde
fn default_total_capacity() -> usize {
    20
}

fn default_categories() -> BTreeMap<String, usize> {
    BTreeMap::from([("bike".to_string(), 5), ("scooter".to_string(), 8)])
}

fn default_clients() -> usize {
    100
}

fn default_max_hold_ms() -> u64 {
    3000 // 3 seconds
}
