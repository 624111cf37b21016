//! Course marks: position, rounding side, course link and laylines.

use std::collections::HashMap;
use std::f64::consts::SQRT_2;
use std::sync::OnceLock;

use hecs::World;
use serde::{Deserialize, Serialize};

use racetrainer_core::constants::*;
use racetrainer_core::enums::Side;
use racetrainer_core::params::{Colour, ParamField, ParamSchema, Parameterised};
use racetrainer_core::state::{MarkView, Segment};
use racetrainer_core::types::{Direction, Location, Polar};

use crate::components::Instance;

/// A course mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub location: Location,
    pub colour: Colour,
    pub layline_colour: Colour,
    /// Side the mark is left on when rounding.
    pub leave_to: Side,
    pub windward_laylines: bool,
    pub downwind_laylines: bool,
    pub layline_length: f64,
    pub next_mark: Option<String>,
    layline_base: Location,
}

impl Default for Mark {
    fn default() -> Self {
        Self {
            location: Location::default(),
            colour: Colour::RED,
            layline_colour: Colour::BLACK,
            leave_to: Side::Port,
            windward_laylines: false,
            downwind_laylines: false,
            layline_length: DEFAULT_LAYLINE_LENGTH,
            next_mark: None,
            layline_base: Location::default(),
        }
    }
}

impl Mark {
    /// Recompute where laylines start for the wind at the mark: two mark
    /// sizes off, across the wind on the rounding side.
    pub fn update_layline_base(&mut self, wind: Direction) {
        let across = if self.downwind_laylines {
            self.leave_to.sign()
        } else {
            -self.leave_to.sign()
        };
        self.layline_base = Polar::new(2.0 * MARK_SIZE, wind.offset(f64::from(across * 90)))
            .to_location(self.location);
    }

    pub fn layline_base(&self) -> Location {
        self.layline_base
    }

    /// Layline segments for the wind at the mark.
    pub fn laylines(&self, wind: Direction) -> Vec<Segment> {
        let mut angles = Vec::new();
        if self.windward_laylines {
            angles.extend([135.0, -135.0]);
        }
        if self.downwind_laylines {
            angles.extend([45.0, -45.0]);
        }
        angles
            .into_iter()
            .map(|angle| Segment {
                from: self.layline_base,
                to: Polar::new(self.layline_length, wind.offset(angle))
                    .to_location(self.layline_base),
            })
            .collect()
    }

    /// Course to the point where a boat at `boat_pos` should pass this
    /// mark. `allowance` is the distance the boat covers along `heading`
    /// while turning; `boat_offset` widens the passing point.
    pub fn course_polar(
        &self,
        boat_pos: Location,
        heading: Direction,
        reach_downwind: bool,
        boat_offset: f64,
        allowance: f64,
        wind: Direction,
    ) -> Polar {
        let to_mark = Polar::between(boat_pos, self.location) - Polar::new(allowance, heading);
        let side = f64::from(-self.leave_to.sign() * 90);
        let gap = MARK_SIZE + boat_offset;
        let relative = to_mark.abs_angle_diff(&wind);
        let pass = if relative <= 45 {
            Polar::new(gap * 2.0, wind.offset(side))
        } else if relative >= 135 && reach_downwind {
            Polar::new(gap * 2.0, wind.opposite().offset(side))
        } else {
            Polar::new(gap * SQRT_2, heading.offset(side))
        };
        to_mark + pass
    }

    pub fn view(&self, name: &str, wind: Direction) -> MarkView {
        MarkView {
            name: name.to_string(),
            location: self.location,
            colour: self.colour,
            leave_to: self.leave_to,
            next_mark: self.next_mark.clone(),
            layline_colour: self.layline_colour,
            laylines: self.laylines(wind),
        }
    }
}

type Field = ParamField<Mark>;

fn schema() -> &'static ParamSchema<Mark> {
    static SCHEMA: OnceLock<ParamSchema<Mark>> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        ParamSchema::new(vec![
            Field::location("location", |m: &mut Mark, v| m.location = v),
            Field::yes_no("windwardlaylines", |m: &mut Mark, v| m.windward_laylines = v),
            Field::yes_no("downwindlaylines", |m: &mut Mark, v| m.downwind_laylines = v),
            Field::real("laylinelength", |m: &mut Mark, v| m.layline_length = v),
            Field::colour("laylinecolour", |m: &mut Mark, v| m.layline_colour = v),
            Field::colour("colour", |m: &mut Mark, v| m.colour = v),
            Field::yes_no("leavetoport", |m: &mut Mark, v| {
                m.leave_to = if v { Side::Port } else { Side::Starboard }
            }),
            Field::text("nextmark", |m: &mut Mark, v: &str| {
                m.next_mark = (!v.is_empty()).then(|| v.to_string())
            }),
        ])
    })
}

impl Parameterised for Mark {
    fn schema(&self) -> &'static ParamSchema<Self> {
        schema()
    }
}

/// What a boat needs to know about one mark.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseMark {
    pub location: Location,
    pub leave_to: Side,
    pub next_mark: Option<String>,
}

/// Read-only view of every mark by name, taken once per second before
/// boats move.
#[derive(Debug, Clone, Default)]
pub struct Course {
    marks: HashMap<String, CourseMark>,
}

impl Course {
    pub fn from_world(world: &World) -> Self {
        let marks = world
            .query::<(&Instance, &Mark)>()
            .iter()
            .map(|(_, (instance, mark))| {
                (
                    instance.name.clone(),
                    CourseMark {
                        location: mark.location,
                        leave_to: mark.leave_to,
                        next_mark: mark.next_mark.clone(),
                    },
                )
            })
            .collect();
        Self { marks }
    }

    pub fn get(&self, name: &str) -> Option<&CourseMark> {
        self.marks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
