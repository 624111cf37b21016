//! Events emitted by the simulation for driver and UI feedback.

use serde::{Deserialize, Serialize};

/// Something noteworthy that happened during the last tick(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A boat finished rounding a mark and started its next leg.
    MarkRounded { boat: String, mark: String, secs: u32 },
    /// A boat stopped at the end of its course.
    BoatStopped { boat: String, secs: u32 },
    /// Scheduled parameters were applied.
    OverrideApplied { instance: String, secs: u32 },
    /// A key binding was applied.
    KeyApplied { key: String, instance: String },
}
