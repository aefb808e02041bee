//! Pluggable category selection and occupancy sources

use poolgate_errors::DriverError;
use poolgate_types::CategoryId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Picks the category a client will request
pub trait CategorySelector {
    fn select(&mut self, client: usize) -> CategoryId;
}

/// Decides how long a client holds its unit before releasing it
pub trait OccupancySource {
    fn hold_for(&mut self, client: usize) -> Duration;
}

impl<S: CategorySelector + ?Sized> CategorySelector for Box<S> {
    fn select(&mut self, client: usize) -> CategoryId {
        (**self).select(client)
    }
}

impl<O: OccupancySource + ?Sized> OccupancySource for Box<O> {
    fn hold_for(&mut self, client: usize) -> Duration {
        (**self).hold_for(client)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Uniformly random category per client
#[derive(Debug)]
pub struct RandomSelector {
    categories: Vec<CategoryId>,
    rng: StdRng,
}

impl RandomSelector {
    /// # Errors
    ///
    /// Returns `NoCategories` if `categories` is empty.
    pub fn new(categories: Vec<CategoryId>, seed: Option<u64>) -> Result<Self, DriverError> {
        if categories.is_empty() {
            return Err(DriverError::NoCategories);
        }
        Ok(Self {
            categories,
            rng: seeded_rng(seed),
        })
    }
}

impl CategorySelector for RandomSelector {
    fn select(&mut self, _client: usize) -> CategoryId {
        let index = self.rng.random_range(0..self.categories.len());
        self.categories[index].clone()
    }
}

/// Categories in the given order, wrapping around
#[derive(Debug, Clone)]
pub struct RoundRobin {
    categories: Vec<CategoryId>,
    next: usize,
}

impl RoundRobin {
    /// # Errors
    ///
    /// Returns `NoCategories` if `categories` is empty.
    pub fn new(categories: Vec<CategoryId>) -> Result<Self, DriverError> {
        if categories.is_empty() {
            return Err(DriverError::NoCategories);
        }
        Ok(Self::over(categories))
    }

    pub(crate) fn over(categories: Vec<CategoryId>) -> Self {
        Self {
            categories,
            next: 0,
        }
    }
}

impl CategorySelector for RoundRobin {
    fn select(&mut self, _client: usize) -> CategoryId {
        let category = self.categories[self.next].clone();
        self.next = (self.next + 1) % self.categories.len();
        category
    }
}

/// Explicit per-client categories; client `n` gets `sequence[n % len]`
///
/// Unlike the other selectors the sequence is not checked against any
/// pool, so tests can feed unknown categories on purpose.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    sequence: Vec<CategoryId>,
}

impl FixedSequence {
    /// # Errors
    ///
    /// Returns `NoCategories` if `sequence` is empty.
    pub fn new<I, C>(sequence: I) -> Result<Self, DriverError>
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryId>,
    {
        let sequence: Vec<CategoryId> = sequence.into_iter().map(Into::into).collect();
        if sequence.is_empty() {
            return Err(DriverError::NoCategories);
        }
        Ok(Self { sequence })
    }
}

impl CategorySelector for FixedSequence {
    fn select(&mut self, client: usize) -> CategoryId {
        self.sequence[client % self.sequence.len()].clone()
    }
}

/// Same hold duration for every client
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOccupancy(pub Duration);

impl OccupancySource for FixedOccupancy {
    fn hold_for(&mut self, _client: usize) -> Duration {
        self.0
    }
}

/// Hold durations drawn uniformly from `min..=max`
#[derive(Debug)]
pub struct RandomOccupancy {
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl RandomOccupancy {
    /// # Errors
    ///
    /// Returns `InvalidHoldRange` if `min` is longer than `max`.
    pub fn new(min: Duration, max: Duration, seed: Option<u64>) -> Result<Self, DriverError> {
        if min > max {
            return Err(DriverError::InvalidHoldRange {
                min_ms: duration_ms(min),
                max_ms: duration_ms(max),
            });
        }
        Ok(Self {
            min,
            max,
            rng: seeded_rng(seed),
        })
    }
}

impl OccupancySource for RandomOccupancy {
    fn hold_for(&mut self, _client: usize) -> Duration {
        let ms = self
            .rng
            .random_range(duration_ms(self.min)..=duration_ms(self.max));
        Duration::from_millis(ms)
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
