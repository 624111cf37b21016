//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Boat behaviour state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SailingMode {
    /// Sailing the current heading; decisions are evaluated each tick.
    #[default]
    SailOn,
    /// Course complete or nowhere to go. Terminal.
    Stopped,
    /// Turning around a mark; the leg advances when the turn completes.
    MarkRounding,
    /// Turning onto a pending target heading.
    Turn,
}

/// Port or starboard. Used for the current tack, a turn direction and the
/// side a mark is left on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Port,
    Starboard,
}

impl Side {
    /// +1 for starboard, -1 for port.
    pub fn sign(self) -> i32 {
        match self {
            Side::Port => -1,
            Side::Starboard => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Port => Side::Starboard,
            Side::Starboard => Side::Port,
        }
    }

    pub fn from_sign(sign: i32) -> Side {
        if sign < 0 {
            Side::Port
        } else {
            Side::Starboard
        }
    }
}

/// Construction-time flow field variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowVariant {
    /// Four independently configured corners.
    Complex,
    /// One flow everywhere.
    #[default]
    Constant,
    /// One flow everywhere, configured by its mean direction.
    Swinging,
    /// Flow varies between a north and a south edge.
    NorthSouthGradient,
    /// Flow varies between an east and a west edge.
    EastWestGradient,
}

/// Boat class, selecting metrics and speed table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoatClass {
    #[default]
    Laser2,
}

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Scenario loaded, clock not started.
    #[default]
    Ready,
    Running,
    Paused,
}

/// Built-in demonstration scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioId {
    /// One boat beating to a single windward mark.
    #[default]
    SingleBeat,
    /// Two boats on a windward/leeward course with a scheduled wind shift.
    WindwardLeeward,
    /// A small fleet in an oscillating, randomly shifting breeze.
    ShiftyFleet,
}

/// Outcome of setting a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamStatus {
    Ok,
    BadKey,
    BadValue,
}
