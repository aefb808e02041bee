#![deny(clippy::pedantic, unsafe_code)]

//! Multi-category admission control for poolgate
//!
//! This crate provides a shared resource pool with a global capacity and
//! per-category sub-capacities. Clients block in [`ResourcePool::acquire`]
//! while the pool is saturated and are woken by [`ResourcePool::release`].
//! Waking is done either by a native condition variable or by a
//! [`WaitGate`], a counting semaphore paired with an explicit waiter count.

pub mod gate;
pub mod limits;
pub mod pool;

pub use gate::WaitGate;
pub use limits::PoolConfig;
pub use pool::{PoolPermit, ResourcePool};
pub use poolgate_types::{CategoryId, PoolSnapshot, WakeStrategy};
