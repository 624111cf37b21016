//! Error types.
//!
//! Configuration problems are collected and reported together
//! ([`ScenarioErrors`]); a broken invariant while the clock runs is a
//! [`SimError`] that aborts the tick.

use thiserror::Error;

/// Every configuration problem found while loading a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario rejected with {} error(s):\n{}", .0.len(), .0.join("\n"))]
pub struct ScenarioErrors(pub Vec<String>);

/// Internal invariant violation during a simulation tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A leg refers to a mark that is not in the course.
    #[error("boat {boat} refers to unknown mark {mark}")]
    UnknownMark { boat: String, mark: String },
    /// A scheduled override could not be applied.
    #[error("override at {secs}s failed: {}", .messages.join("; "))]
    OverrideFailed { secs: u32, messages: Vec<String> },
    /// A key binding could not be applied.
    #[error("key binding {key:?} failed: {}", .messages.join("; "))]
    KeyBindingFailed { key: String, messages: Vec<String> },
    /// Rebuilding the world from its definition failed.
    #[error("rebuild failed: {0}")]
    Rebuild(#[from] ScenarioErrors),
}
