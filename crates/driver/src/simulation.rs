//! Concurrent client simulation
//!
//! Every client is planned up front (category and hold time), then runs on
//! its own scoped thread: acquire, hold without touching the pool, release.

use crate::report::{ClientOutcome, SimulationReport};
use crate::strategy::{duration_ms, CategorySelector, FixedOccupancy, OccupancySource, RoundRobin};
use poolgate_errors::{DriverError, Error};
use poolgate_resources::ResourcePool;
use poolgate_types::CategoryId;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Planned behaviour of one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSpec {
    pub id: usize,
    pub category: CategoryId,
    pub hold: Duration,
}

/// Runs a batch of clients against a pool
pub struct Simulation<'p> {
    pool: &'p ResourcePool,
    clients: usize,
    selector: Box<dyn CategorySelector + 'p>,
    occupancy: Box<dyn OccupancySource + 'p>,
}

impl<'p> Simulation<'p> {
    /// Round-robin over the pool's categories with zero hold time
    #[must_use]
    pub fn new(pool: &'p ResourcePool, clients: usize) -> Self {
        Self {
            pool,
            clients,
            // a validated PoolConfig always has at least one category
            selector: Box::new(RoundRobin::over(pool.config().category_ids())),
            occupancy: Box::new(FixedOccupancy::default()),
        }
    }

    #[must_use]
    pub fn with_selector(mut self, selector: impl CategorySelector + 'p) -> Self {
        self.selector = Box::new(selector);
        self
    }

    #[must_use]
    pub fn with_occupancy(mut self, occupancy: impl OccupancySource + 'p) -> Self {
        self.occupancy = Box::new(occupancy);
        self
    }

    /// Draw every client's category and hold time
    pub fn plan(&mut self) -> Vec<ClientSpec> {
        (0..self.clients)
            .map(|id| ClientSpec {
                id,
                category: self.selector.select(id),
                hold: self.occupancy.hold_for(id),
            })
            .collect()
    }

    /// Plan and run all clients, returning once every one has released
    ///
    /// # Errors
    ///
    /// Returns a pool error if a client asks for an unknown category and a
    /// driver error if a client thread panics.
    pub fn run(&mut self) -> Result<SimulationReport, Error> {
        let plan = self.plan();
        self.run_plan(plan)
    }

    /// Run an explicit set of clients
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::run`].
    pub fn run_plan(&self, plan: Vec<ClientSpec>) -> Result<SimulationReport, Error> {
        let pool = self.pool;
        let peak = AtomicUsize::new(0);
        let started = Instant::now();

        info!(
            clients = plan.len(),
            strategy = %pool.strategy(),
            "starting simulation"
        );

        let results: Vec<Result<ClientOutcome, Error>> = thread::scope(|s| {
            let peak = &peak;
            let handles: Vec<_> = plan
                .into_iter()
                .map(|spec| {
                    let id = spec.id;
                    (id, s.spawn(move || run_client(pool, spec, peak)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(id, handle)| {
                    handle.join().unwrap_or_else(|payload| {
                        Err(DriverError::ClientPanicked {
                            client: id,
                            message: panic_message(payload.as_ref()),
                        }
                        .into())
                    })
                })
                .collect()
        });
        let outcomes = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let report = SimulationReport {
            strategy: pool.strategy(),
            outcomes,
            elapsed_ms: duration_ms(started.elapsed()),
            peak_total: peak.load(Ordering::Relaxed),
            final_snapshot: pool.snapshot(),
        };
        info!(
            clients = report.outcomes.len(),
            elapsed_ms = report.elapsed_ms,
            peak_total = report.peak_total,
            "simulation finished"
        );
        Ok(report)
    }
}

fn run_client(
    pool: &ResourcePool,
    spec: ClientSpec,
    peak: &AtomicUsize,
) -> Result<ClientOutcome, Error> {
    let requested = Instant::now();
    let permit = pool.acquire_permit(&spec.category)?;
    let waited = requested.elapsed();

    peak.fetch_max(pool.snapshot().used_total, Ordering::Relaxed);
    info!(client = spec.id, category = %spec.category, "client entered");

    thread::sleep(spec.hold);

    drop(permit);
    info!(client = spec.id, category = %spec.category, "client left");
    debug!(client = spec.id, waited_ms = duration_ms(waited), "client outcome");

    Ok(ClientOutcome {
        client: spec.id,
        category: spec.category,
        waited_ms: duration_ms(waited),
        held_ms: duration_ms(spec.hold),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
