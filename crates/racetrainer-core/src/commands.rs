//! Commands sent from the driver to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible driver actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Start the clock on a loaded scenario.
    Start,
    Pause,
    Resume,
    /// Discard all entities and rebuild from the scenario definition.
    Reset,
    /// Apply the parameters bound to a key.
    Key { key: String },
}
