//! Boat handling for the race trainer.
//!
//! Boat-class profiles and performance tables, plus the sailing decision
//! state machine that steers a boat round the course.

pub mod fsm;
pub mod performance;
pub mod profiles;

pub use racetrainer_core as core;
