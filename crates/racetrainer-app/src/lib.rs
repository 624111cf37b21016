//! Headless race trainer driver.
//!
//! Runs a simulation engine on its own thread behind an explicit
//! [`state::SimHandle`] and exposes the latest snapshot for polling.

pub mod game_loop;
pub mod state;

pub use racetrainer_core as core;
