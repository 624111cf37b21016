//! Simulation snapshot: the complete drawable state handed to a renderer
//! after each tick. Plain data, no graphics types.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::params::Colour;
use crate::types::{Bounds, Flow, Location, SimTime};

/// Complete simulation state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    /// Elapsed time as `mm:ss`.
    pub clock: String,
    pub phase: SimPhase,
    pub scenario: ScenarioView,
    pub wind: FlowView,
    pub water: FlowView,
    pub marks: Vec<MarkView>,
    pub boats: Vec<BoatView>,
    pub events: Vec<SimEvent>,
}

/// Scenario-wide display settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioView {
    pub title: String,
    pub bounds: Bounds,
    pub limits: Option<Bounds>,
    /// Pixels per metre.
    pub zoom: f64,
    pub seconds_per_display: u32,
    pub speedup: f64,
    /// Distance from the start location to the first mark (m).
    pub first_leg_distance: Option<f64>,
}

/// A flow field as drawn: its mean and, when enabled, sampled arrows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowView {
    pub variant: FlowVariant,
    pub mean: Flow,
    pub colour: Option<Colour>,
    pub arrows: Vec<FlowSample>,
}

/// Flow at one point of the display grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlowSample {
    pub location: Location,
    pub flow: Flow,
}

/// One line segment, e.g. a layline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Location,
    pub to: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkView {
    pub name: String,
    pub location: Location,
    pub colour: Colour,
    pub leave_to: Side,
    pub next_mark: Option<String>,
    pub layline_colour: Colour,
    pub laylines: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatView {
    pub name: String,
    pub class: BoatClass,
    pub position: Location,
    /// Heading in whole degrees (-180, 180].
    pub heading: i32,
    /// Speed through the water (m/s).
    pub speed: f64,
    pub mode: SailingMode,
    pub tack: Side,
    /// Boom angle relative to the centreline (degrees, signed by tack).
    pub sail_angle: i32,
    pub next_mark: Option<String>,
    pub following_mark: Option<String>,
    pub distance_to_mark: Option<f64>,
    pub wind: Flow,
    pub colour: Colour,
    pub track_colour: Colour,
    pub track: Vec<Location>,
}
