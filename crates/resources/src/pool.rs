//! Shared resource pool with global and per-category capacities
//!
//! All counters live behind one mutex. [`ResourcePool::acquire`] tests the
//! admission condition with the lock held and parks with the lock released;
//! every wake leads back to a recheck. [`ResourcePool::release`] wakes every
//! parked client, whatever category it waits for. There is no ordering
//! among waiters: a client can be re-parked indefinitely while later
//! arrivals win the recheck.

use crate::gate::WaitGate;
use crate::limits::PoolConfig;
use poolgate_errors::PoolError;
use poolgate_types::{CategoryId, CategoryUsage, PoolSnapshot, WakeStrategy};
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Counters guarded by the pool mutex
#[derive(Debug)]
struct PoolState {
    used_total: usize,
    /// Indexed by category slot, same order as the config
    used: Vec<usize>,
    /// Clients currently parked waiting for capacity
    waiters: usize,
}

impl PoolState {
    fn new(config: &PoolConfig) -> Self {
        Self {
            used_total: 0,
            used: vec![0; config.category_count()],
            waiters: 0,
        }
    }

    fn admits(&self, config: &PoolConfig, slot: usize) -> bool {
        self.used_total < config.total_capacity() && self.used[slot] < config.slot_capacity(slot)
    }

    fn admit(&mut self, slot: usize) {
        self.used_total += 1;
        self.used[slot] += 1;
        debug_assert_eq!(self.used_total, self.used.iter().sum::<usize>());
    }

    fn free(&mut self, slot: usize) {
        self.used_total -= 1;
        self.used[slot] -= 1;
        debug_assert_eq!(self.used_total, self.used.iter().sum::<usize>());
    }
}

enum Wake {
    Broadcast(Condvar),
    Gate(WaitGate),
}

impl Wake {
    fn new(strategy: WakeStrategy) -> Self {
        match strategy {
            WakeStrategy::Condvar => Self::Broadcast(Condvar::new()),
            WakeStrategy::Semaphore => Self::Gate(WaitGate::new()),
        }
    }

    fn strategy(&self) -> WakeStrategy {
        match self {
            Self::Broadcast(_) => WakeStrategy::Condvar,
            Self::Gate(_) => WakeStrategy::Semaphore,
        }
    }
}

/// Bounded multi-category resource pool
///
/// Share it between threads with an `Arc` or by reference from a
/// `std::thread::scope`.
pub struct ResourcePool {
    config: PoolConfig,
    state: Mutex<PoolState>,
    wake: Wake,
}

impl ResourcePool {
    /// Create an empty pool
    #[must_use]
    pub fn new(config: PoolConfig, strategy: WakeStrategy) -> Self {
        let state = PoolState::new(&config);
        Self {
            config,
            state: Mutex::new(state),
            wake: Wake::new(strategy),
        }
    }

    /// Create an empty pool from raw capacities with the default strategy
    ///
    /// # Errors
    ///
    /// Returns an error if the capacities do not form a valid [`PoolConfig`].
    pub fn from_capacities<I, C>(total_capacity: usize, categories: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (C, usize)>,
        C: Into<CategoryId>,
    {
        let config = PoolConfig::new(total_capacity, categories)?;
        Ok(Self::new(config, WakeStrategy::default()))
    }

    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    #[must_use]
    pub fn strategy(&self) -> WakeStrategy {
        self.wake.strategy()
    }

    /// Take one unit of `category`, blocking while the pool cannot admit it
    ///
    /// Admission requires a free unit under the global capacity and under
    /// the category's own capacity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` if `category` is not configured. The check
    /// happens before any blocking and the caller is never registered as a
    /// waiter in that case.
    pub fn acquire<C>(&self, category: &C) -> Result<(), PoolError>
    where
        C: AsRef<str> + ?Sized,
    {
        let slot = self.slot(category.as_ref())?;
        self.acquire_slot(slot);
        Ok(())
    }

    /// Take one unit of `category` and hold it until the permit is dropped
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` if `category` is not configured.
    pub fn acquire_permit<C>(&self, category: &C) -> Result<PoolPermit<'_>, PoolError>
    where
        C: AsRef<str> + ?Sized,
    {
        let slot = self.slot(category.as_ref())?;
        self.acquire_slot(slot);
        Ok(PoolPermit { pool: self, slot })
    }

    /// Take one unit of `category` only if that is possible right now
    ///
    /// Returns `Ok(false)` when the pool is saturated for `category`.
    /// Never parks and never counts as a waiter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` if `category` is not configured.
    pub fn try_acquire<C>(&self, category: &C) -> Result<bool, PoolError>
    where
        C: AsRef<str> + ?Sized,
    {
        let slot = self.slot(category.as_ref())?;
        let mut state = self.lock_state();
        if state.admits(&self.config, slot) {
            state.admit(slot);
            trace!(
                category = %self.config.slot_id(slot),
                used_total = state.used_total,
                "admitted without waiting"
            );
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return one unit of `category` and wake every parked client
    ///
    /// The caller must hold a unit of `category` from an earlier acquire.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` if `category` is not configured.
    ///
    /// # Panics
    ///
    /// Panics if no unit of `category` is currently held. The pool is left
    /// untouched in that case.
    pub fn release<C>(&self, category: &C) -> Result<(), PoolError>
    where
        C: AsRef<str> + ?Sized,
    {
        let slot = self.slot(category.as_ref())?;
        self.release_slot(slot);
        Ok(())
    }

    /// Consistent copy of the pool counters
    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.lock_state();
        PoolSnapshot {
            total_capacity: self.config.total_capacity(),
            used_total: state.used_total,
            waiters: state.waiters,
            categories: self
                .config
                .categories()
                .zip(&state.used)
                .map(|((category, capacity), &used)| CategoryUsage {
                    category: category.clone(),
                    capacity,
                    used,
                })
                .collect(),
        }
    }

    fn slot(&self, category: &str) -> Result<usize, PoolError> {
        self.config
            .slot(category)
            .ok_or_else(|| PoolError::invalid_category(category))
    }

    // A panic while the lock is held only ever fires before mutation, so a
    // poisoned guard still protects consistent counters.
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire_slot(&self, slot: usize) {
        let mut state = self.lock_state();
        while !state.admits(&self.config, slot) {
            state.waiters += 1;
            debug!(
                category = %self.config.slot_id(slot),
                used_total = state.used_total,
                used = state.used[slot],
                waiters = state.waiters,
                "pool saturated, parking"
            );
            state = match &self.wake {
                Wake::Broadcast(condvar) => condvar
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Wake::Gate(gate) => {
                    drop(state);
                    gate.park();
                    self.lock_state()
                }
            };
            state.waiters -= 1;
        }
        state.admit(slot);
        trace!(
            category = %self.config.slot_id(slot),
            used_total = state.used_total,
            used = state.used[slot],
            "admitted"
        );
    }

    fn release_slot(&self, slot: usize) {
        let mut state = self.lock_state();
        assert!(
            state.used[slot] > 0,
            "release of {} without a matching acquire",
            self.config.slot_id(slot)
        );
        state.free(slot);

        let to_wake = state.waiters;
        match &self.wake {
            Wake::Broadcast(condvar) => {
                if to_wake > 0 {
                    condvar.notify_all();
                }
            }
            Wake::Gate(gate) => gate.post(to_wake),
        }
        trace!(
            category = %self.config.slot_id(slot),
            used_total = state.used_total,
            woken = to_wake,
            "released"
        );
    }
}

impl fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("config", &self.config)
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}

/// One unit of a pool category, returned to the pool on drop
#[must_use = "dropping a permit releases its unit immediately"]
pub struct PoolPermit<'a> {
    pool: &'a ResourcePool,
    slot: usize,
}

impl PoolPermit<'_> {
    /// Category this permit holds a unit of
    #[must_use]
    pub fn category(&self) -> &CategoryId {
        self.pool.config.slot_id(self.slot)
    }
}

impl Drop for PoolPermit<'_> {
    fn drop(&mut self) {
        self.pool.release_slot(self.slot);
    }
}

impl fmt::Debug for PoolPermit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolPermit")
            .field("category", self.category())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn pool(strategy: WakeStrategy) -> ResourcePool {
        ResourcePool::new(PoolConfig::for_testing(), strategy)
    }

    #[test]
    fn test_new_pool_is_idle() {
        for strategy in [WakeStrategy::Condvar, WakeStrategy::Semaphore] {
            let pool = pool(strategy);
            assert!(pool.snapshot().is_idle());
            assert_eq!(pool.strategy(), strategy);
        }
    }

    #[test]
    fn test_from_capacities_builds_idle_condvar_pool() {
        let pool = ResourcePool::from_capacities(2, [("a", 1), ("b", 2)]).unwrap();
        assert_eq!(pool.strategy(), WakeStrategy::Condvar);
        assert_eq!(pool.config().total_capacity(), 2);
        assert_eq!(pool.config().capacity("b"), Some(2));

        let snap = pool.snapshot();
        assert!(snap.is_idle());
        assert_eq!(snap.categories.len(), 2);

        assert!(pool.try_acquire("a").unwrap());
        pool.release("a").unwrap();
        assert!(pool.snapshot().is_idle());
    }

    #[test]
    fn test_from_capacities_rejects_zero_capacity() {
        let err = ResourcePool::from_capacities(2, [("a", 1), ("b", 0)]).unwrap_err();
        assert_eq!(
            err,
            PoolError::InvalidCapacity {
                category: "b".to_string(),
                capacity: 0,
            }
        );
        assert!(ResourcePool::from_capacities(0, [("a", 1)]).is_err());
    }

    #[test]
    fn test_try_acquire_respects_both_limits() {
        let pool = pool(WakeStrategy::Condvar);
        assert!(pool.try_acquire("a").unwrap());
        // a is at its own capacity
        assert!(!pool.try_acquire("a").unwrap());
        assert!(pool.try_acquire("b").unwrap());
        // global capacity reached even though b has room
        assert!(!pool.try_acquire("b").unwrap());

        let snap = pool.snapshot();
        assert_eq!(snap.used_total, 2);
        assert_eq!(snap.waiters, 0);
        assert!(snap.check_invariants().is_empty());
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let pool = pool(WakeStrategy::Semaphore);
        {
            let permit = pool.acquire_permit("b").unwrap();
            assert_eq!(permit.category().as_str(), "b");
            assert_eq!(pool.snapshot().used_total, 1);
        }
        assert!(pool.snapshot().is_idle());
    }

    #[test]
    fn test_release_without_acquire_panics_without_mutation() {
        let pool = pool(WakeStrategy::Condvar);
        pool.acquire("b").unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| pool.release("a")));
        assert!(result.is_err());

        // the poisoned lock is recovered and counters are untouched
        let snap = pool.snapshot();
        assert_eq!(snap.used_total, 1);
        assert_eq!(snap.usage("b").unwrap().used, 1);
        pool.release("b").unwrap();
        assert!(pool.snapshot().is_idle());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let pool = pool(WakeStrategy::Semaphore);
        assert_eq!(
            pool.try_acquire("z"),
            Err(PoolError::invalid_category("z"))
        );
        assert!(pool.release("z").is_err());
        assert!(pool.acquire_permit("z").is_err());
        assert!(pool.snapshot().is_idle());
    }
}
