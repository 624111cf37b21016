//! The flow field: four configured corners interpolated over nine regions.
//!
//! Both wind and water are flow fields. Corners beyond the query point
//! return their flow unchanged; edges interpolate between the two corners
//! sharing them; the centre interpolates between the projected north and
//! south edge flows. Angles interpolate as raw degrees, not as a circular
//! mean, so corners either side of ±180° blend through 0°.

use rand::Rng;
use serde::{Deserialize, Serialize};

use racetrainer_core::constants::DEFAULT_FLOW_ARROW_INTERVAL;
use racetrainer_core::enums::FlowVariant;
use racetrainer_core::params::Colour;
use racetrainer_core::state::{FlowSample, FlowView};
use racetrainer_core::types::{Bounds, Direction, Flow, Location};

use crate::perturbation::{Shift, Swing};

/// One corner of the field: where it is and the flow there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub location: Location,
    pub flow: Flow,
}

/// Arrow display hints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowDisplay {
    pub show: bool,
    /// Arrow spacing (m).
    pub interval: f64,
    pub colour: Colour,
}

impl Default for FlowDisplay {
    fn default() -> Self {
        Self {
            show: false,
            interval: DEFAULT_FLOW_ARROW_INTERVAL,
            colour: Colour::BLACK,
        }
    }
}

/// A wind or water flow field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    pub(crate) variant: FlowVariant,
    pub north_east: Corner,
    pub north_west: Corner,
    pub south_east: Corner,
    pub south_west: Corner,
    pub display: FlowDisplay,
    pub swing: Swing,
    pub shift: Shift,
    /// Visible area, used to lay out display arrows.
    edges: Bounds,
}

impl FlowField {
    /// Create a field of the given variant over the scenario's visible area.
    /// All flows start still; variant keys configure them.
    pub fn new(variant: FlowVariant, edges: Bounds) -> Self {
        let (ne, nw, se, sw) = match variant {
            FlowVariant::Constant | FlowVariant::Swinging => {
                let sw = edges.south_west();
                (sw, sw, sw, sw)
            }
            FlowVariant::Complex
            | FlowVariant::NorthSouthGradient
            | FlowVariant::EastWestGradient => (
                edges.north_east(),
                edges.north_west(),
                edges.south_east(),
                edges.south_west(),
            ),
        };
        let corner = |location| Corner {
            location,
            flow: Flow::default(),
        };
        let mut swing = Swing::default();
        if variant == FlowVariant::Swinging {
            swing.enabled = true;
        }
        Self {
            variant,
            north_east: corner(ne),
            north_west: corner(nw),
            south_east: corner(se),
            south_west: corner(sw),
            display: FlowDisplay::default(),
            swing,
            shift: Shift::default(),
            edges,
        }
    }

    /// A field with one flow everywhere.
    pub fn constant(edges: Bounds, flow: Flow) -> Self {
        let mut field = Self::new(FlowVariant::Constant, edges);
        field.set_all(flow);
        field
    }

    pub fn variant(&self) -> FlowVariant {
        self.variant
    }

    pub(crate) fn set_all(&mut self, flow: Flow) {
        for corner in self.corners_mut() {
            corner.flow = flow;
        }
    }

    pub(crate) fn corners_mut(&mut self) -> [&mut Corner; 4] {
        [
            &mut self.north_east,
            &mut self.north_west,
            &mut self.south_east,
            &mut self.south_west,
        ]
    }

    /// Recompute time-based perturbations for second `secs`.
    pub fn advance<R: Rng>(&mut self, secs: u32, rng: &mut R) {
        self.swing.advance(secs);
        self.shift.advance(secs, rng);
    }

    /// Flow at `pos`, including swing and shift.
    pub fn flow_at(&self, pos: Location) -> Flow {
        let base = self.unperturbed_flow_at(pos);
        let mut offset = 0.0;
        if self.swing.enabled {
            offset += self.swing.now;
        }
        if self.shift.enabled {
            offset += self.shift.now;
        }
        if offset == 0.0 {
            base
        } else {
            Flow::new(base.from.offset(offset), base.knots)
        }
    }

    /// Arithmetic mean of the four corner flows (no perturbation).
    pub fn mean_flow(&self) -> Flow {
        let corners = [
            &self.north_east,
            &self.north_west,
            &self.south_east,
            &self.south_west,
        ];
        let degrees: f64 = corners.iter().map(|c| c.flow.from.degrees_f64()).sum();
        let knots: f64 = corners.iter().map(|c| c.flow.knots).sum();
        Flow::from_degrees(degrees / 4.0, knots / 4.0)
    }

    fn unperturbed_flow_at(&self, pos: Location) -> Flow {
        let (ne, nw, se, sw) = (
            &self.north_east,
            &self.north_west,
            &self.south_east,
            &self.south_west,
        );

        // Corner regions
        if pos.x <= nw.location.x && pos.y >= nw.location.y {
            return nw.flow;
        }
        if pos.x >= ne.location.x && pos.y >= ne.location.y {
            return ne.flow;
        }
        if pos.x <= sw.location.x && pos.y <= sw.location.y {
            return sw.flow;
        }
        if pos.x >= se.location.x && pos.y <= se.location.y {
            return se.flow;
        }

        // Edge points and flows level with the query point
        let west_x = project(nw.location.y, nw.location.x, sw.location.y, sw.location.x, pos.y);
        let west = along_y(nw, sw, pos.y);
        let east_x = project(ne.location.y, ne.location.x, se.location.y, se.location.x, pos.y);
        let east = along_y(ne, se, pos.y);
        let north_y = project(ne.location.x, ne.location.y, nw.location.x, nw.location.y, pos.x);
        let north = along_x(ne, nw, pos.x);
        let south_y = project(se.location.x, se.location.y, sw.location.x, sw.location.y, pos.x);
        let south = along_x(se, sw, pos.x);

        // Edge regions
        if pos.y > north_y {
            return north;
        }
        if pos.y < south_y {
            return south;
        }
        if pos.x < west_x {
            return west;
        }
        if pos.x > east_x {
            return east;
        }

        // Centre
        interpolate(south, north, ratio(south_y, north_y, pos.y))
    }

    /// Flow samples on the display grid, when arrows are enabled.
    pub fn arrows(&self) -> Vec<FlowSample> {
        let mut samples = Vec::new();
        let step = self.display.interval;
        if !self.display.show || step <= 0.0 {
            return samples;
        }
        let mut x = self.edges.west + step;
        while x < self.edges.east {
            let mut y = self.edges.south + step;
            while y < self.edges.north {
                let location = Location::new(x, y);
                samples.push(FlowSample {
                    location,
                    flow: self.flow_at(location),
                });
                y += step;
            }
            x += step;
        }
        samples
    }

    pub fn view(&self) -> FlowView {
        FlowView {
            variant: self.variant,
            mean: self.mean_flow(),
            colour: self.display.show.then_some(self.display.colour),
            arrows: self.arrows(),
        }
    }
}

/// Position of `at` between `from` and `to`; 0 when they coincide.
fn ratio(from: f64, to: f64, at: f64) -> f64 {
    let span = to - from;
    if span == 0.0 {
        0.0
    } else {
        (at - from) / span
    }
}

/// The dependent coordinate of the line through (a_key, a_val) and
/// (b_key, b_val) at `key`.
fn project(a_key: f64, a_val: f64, b_key: f64, b_val: f64, key: f64) -> f64 {
    b_val + (a_val - b_val) * ratio(b_key, a_key, key)
}

fn interpolate(from: Flow, to: Flow, ratio: f64) -> Flow {
    let from_deg = from.from.degrees_f64();
    let to_deg = to.from.degrees_f64();
    Flow::new(
        Direction::from_degrees(from_deg + ratio * (to_deg - from_deg)),
        from.knots + ratio * (to.knots - from.knots),
    )
}

fn along_x(to: &Corner, from: &Corner, x: f64) -> Flow {
    interpolate(from.flow, to.flow, ratio(from.location.x, to.location.x, x))
}

fn along_y(to: &Corner, from: &Corner, y: f64) -> Flow {
    interpolate(from.flow, to.flow, ratio(from.location.y, to.location.y, y))
}
