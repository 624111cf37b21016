//! Parameter schemas for each flow variant.
//!
//! Every variant accepts the full corner/display/perturbation key set; the
//! simpler variants add shorthand keys that set several corners at once.

use std::sync::OnceLock;

use racetrainer_core::enums::FlowVariant;
use racetrainer_core::params::{ParamField, ParamSchema, Parameterised};
use racetrainer_core::types::Direction;

use crate::field::FlowField;

type Field = ParamField<FlowField>;

fn degrees(angle: i32) -> Direction {
    Direction::from_degrees(f64::from(angle))
}

fn base_fields() -> Vec<Field> {
    vec![
        Field::location("northeastposition", |f: &mut FlowField, v| f.north_east.location = v),
        Field::integer("northeastfrom", |f: &mut FlowField, v| f.north_east.flow.from = degrees(v)),
        Field::real("northeastspeed", |f: &mut FlowField, v| f.north_east.flow.knots = v),
        Field::location("northwestposition", |f: &mut FlowField, v| f.north_west.location = v),
        Field::integer("northwestfrom", |f: &mut FlowField, v| f.north_west.flow.from = degrees(v)),
        Field::real("northwestspeed", |f: &mut FlowField, v| f.north_west.flow.knots = v),
        Field::location("southeastposition", |f: &mut FlowField, v| f.south_east.location = v),
        Field::integer("southeastfrom", |f: &mut FlowField, v| f.south_east.flow.from = degrees(v)),
        Field::real("southeastspeed", |f: &mut FlowField, v| f.south_east.flow.knots = v),
        Field::location("southwestposition", |f: &mut FlowField, v| f.south_west.location = v),
        Field::integer("southwestfrom", |f: &mut FlowField, v| f.south_west.flow.from = degrees(v)),
        Field::real("southwestspeed", |f: &mut FlowField, v| f.south_west.flow.knots = v),
        Field::yes_no("showflow", |f: &mut FlowField, v| f.display.show = v),
        Field::real("showflowinterval", |f: &mut FlowField, v| f.display.interval = v),
        Field::colour("showflowcolour", |f: &mut FlowField, v| f.display.colour = v),
        Field::integer("swingangle", |f: &mut FlowField, v| f.swing.set_angle(v)),
        Field::integer("swingperiod", |f: &mut FlowField, v| f.swing.set_period(v)),
        Field::integer("shiftangle", |f: &mut FlowField, v| f.shift.set_angle(v)),
        Field::integer("shiftperiod", |f: &mut FlowField, v| f.shift.set_period(v)),
        Field::yes_no("randomshifts", |f: &mut FlowField, v| f.shift.set_random(v)),
    ]
}

fn uniform_fields(from_key: &'static str) -> Vec<Field> {
    vec![
        Field::integer(from_key, |f: &mut FlowField, v| {
            for corner in f.corners_mut() {
                corner.flow.from = degrees(v);
            }
        }),
        Field::real("speed", |f: &mut FlowField, v| {
            for corner in f.corners_mut() {
                corner.flow.knots = v;
            }
        }),
    ]
}

fn north_south_fields() -> Vec<Field> {
    vec![
        Field::real("northposition", |f: &mut FlowField, v| {
            f.north_east.location.y = v;
            f.north_west.location.y = v;
        }),
        Field::integer("northfrom", |f: &mut FlowField, v| {
            f.north_east.flow.from = degrees(v);
            f.north_west.flow.from = degrees(v);
        }),
        Field::real("northspeed", |f: &mut FlowField, v| {
            f.north_east.flow.knots = v;
            f.north_west.flow.knots = v;
        }),
        Field::real("southposition", |f: &mut FlowField, v| {
            f.south_east.location.y = v;
            f.south_west.location.y = v;
        }),
        Field::integer("southfrom", |f: &mut FlowField, v| {
            f.south_east.flow.from = degrees(v);
            f.south_west.flow.from = degrees(v);
        }),
        Field::real("southspeed", |f: &mut FlowField, v| {
            f.south_east.flow.knots = v;
            f.south_west.flow.knots = v;
        }),
    ]
}

fn east_west_fields() -> Vec<Field> {
    vec![
        Field::real("eastposition", |f: &mut FlowField, v| {
            f.north_east.location.x = v;
            f.south_east.location.x = v;
        }),
        Field::integer("eastfrom", |f: &mut FlowField, v| {
            f.north_east.flow.from = degrees(v);
            f.south_east.flow.from = degrees(v);
        }),
        Field::real("eastspeed", |f: &mut FlowField, v| {
            f.north_east.flow.knots = v;
            f.south_east.flow.knots = v;
        }),
        Field::real("westposition", |f: &mut FlowField, v| {
            f.north_west.location.x = v;
            f.south_west.location.x = v;
        }),
        Field::integer("westfrom", |f: &mut FlowField, v| {
            f.north_west.flow.from = degrees(v);
            f.south_west.flow.from = degrees(v);
        }),
        Field::real("westspeed", |f: &mut FlowField, v| {
            f.north_west.flow.knots = v;
            f.south_west.flow.knots = v;
        }),
    ]
}

fn build(extra: Vec<Field>) -> ParamSchema<FlowField> {
    let mut fields = base_fields();
    fields.extend(extra);
    ParamSchema::new(fields)
}

/// The schema accepted by flows of `variant`.
pub fn schema_for(variant: FlowVariant) -> &'static ParamSchema<FlowField> {
    static COMPLEX: OnceLock<ParamSchema<FlowField>> = OnceLock::new();
    static CONSTANT: OnceLock<ParamSchema<FlowField>> = OnceLock::new();
    static SWINGING: OnceLock<ParamSchema<FlowField>> = OnceLock::new();
    static NORTH_SOUTH: OnceLock<ParamSchema<FlowField>> = OnceLock::new();
    static EAST_WEST: OnceLock<ParamSchema<FlowField>> = OnceLock::new();

    match variant {
        FlowVariant::Complex => COMPLEX.get_or_init(|| build(Vec::new())),
        FlowVariant::Constant => CONSTANT.get_or_init(|| build(uniform_fields("from"))),
        FlowVariant::Swinging => SWINGING.get_or_init(|| build(uniform_fields("meanfrom"))),
        FlowVariant::NorthSouthGradient => NORTH_SOUTH.get_or_init(|| build(north_south_fields())),
        FlowVariant::EastWestGradient => EAST_WEST.get_or_init(|| build(east_west_fields())),
    }
}

/// Registered class name for a variant.
pub fn class_name(variant: FlowVariant) -> &'static str {
    match variant {
        FlowVariant::Complex => "complexflow",
        FlowVariant::Constant => "constantflow",
        FlowVariant::Swinging => "swingingflow",
        FlowVariant::NorthSouthGradient => "northsouthgradientflow",
        FlowVariant::EastWestGradient => "eastwestgradientflow",
    }
}

/// Variant for a registered class name.
pub fn variant_for_class(class: &str) -> Option<FlowVariant> {
    [
        FlowVariant::Complex,
        FlowVariant::Constant,
        FlowVariant::Swinging,
        FlowVariant::NorthSouthGradient,
        FlowVariant::EastWestGradient,
    ]
    .into_iter()
    .find(|v| class_name(*v) == class)
}

impl Parameterised for FlowField {
    fn schema(&self) -> &'static ParamSchema<Self> {
        schema_for(self.variant)
    }
}
