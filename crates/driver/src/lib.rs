#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Client simulation for poolgate
//!
//! The driver decides what each client requests and how long it holds it,
//! then runs every client on its own thread against a shared
//! [`ResourcePool`](poolgate_resources::ResourcePool). Category choice and
//! occupancy are pluggable so runs can be fully deterministic in tests.

pub mod report;
pub mod simulation;
pub mod strategy;

pub use report::{ClientOutcome, SimulationReport};
pub use simulation::{ClientSpec, Simulation};
pub use strategy::{
    CategorySelector, FixedOccupancy, FixedSequence, OccupancySource, RandomOccupancy,
    RandomSelector, RoundRobin,
};
