//! Simulation engine for the race trainer.
//!
//! Builds a world of marks and boats from a scenario definition, advances
//! it one simulated second at a time and produces snapshots for a
//! renderer. Completely headless: no display code lives here.

pub mod boat;
pub mod components;
pub mod engine;
pub mod mark;
pub mod registry;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use racetrainer_core as core;

#[cfg(test)]
mod tests;
