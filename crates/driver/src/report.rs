//! Simulation results

use poolgate_types::{CategoryId, PoolSnapshot, WakeStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

/// What happened to a single client
#[derive(Debug, Clone, Serialize)]
pub struct ClientOutcome {
    pub client: usize,
    pub category: CategoryId,
    /// Time between calling acquire and being admitted
    pub waited_ms: u64,
    pub held_ms: u64,
}

/// Summary of a completed simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub strategy: WakeStrategy,
    pub outcomes: Vec<ClientOutcome>,
    pub elapsed_ms: u64,
    /// Highest total occupancy any client observed right after admission
    pub peak_total: usize,
    pub final_snapshot: PoolSnapshot,
}

impl SimulationReport {
    /// Number of clients served per category
    #[must_use]
    pub fn per_category(&self) -> BTreeMap<CategoryId, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Longest time any client spent waiting for admission
    #[must_use]
    pub fn max_wait_ms(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|outcome| outcome.waited_ms)
            .max()
            .unwrap_or(0)
    }

    /// Clients that had to wait at least a millisecond
    #[must_use]
    pub fn waited_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.waited_ms > 0)
            .count()
    }

    /// True when every unit was returned and nobody is left waiting
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.final_snapshot.is_idle()
    }
}
