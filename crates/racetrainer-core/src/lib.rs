//! Core types and definitions for the race training simulator.
//!
//! This crate defines the vocabulary shared across all other crates:
//! the geometry kernel, the parameter contract, scenario definitions,
//! commands, snapshots, events, errors and constants.
//! It has no dependency on any runtime framework.

pub mod commands;
pub mod constants;
pub mod definition;
pub mod enums;
pub mod error;
pub mod events;
pub mod params;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
