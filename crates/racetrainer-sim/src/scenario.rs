//! Scenario-wide settings and the built-in demonstration scenarios.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use racetrainer_core::constants::*;
use racetrainer_core::definition::ScenarioDefinition;
use racetrainer_core::enums::ScenarioId;
use racetrainer_core::params::{ParamField, ParamSchema, Parameterised};
use racetrainer_core::state::ScenarioView;
use racetrainer_core::types::{Bounds, Location};

/// Visible area, hard limits, display pacing and course entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSettings {
    pub bounds: Bounds,
    /// Hard limits boats reflect off; unlimited sides sit at ±f64::MAX.
    pub limits: Bounds,
    /// Pixels per metre.
    pub zoom: f64,
    /// Simulated seconds per displayed frame.
    pub seconds_per_display: u32,
    pub speedup: f64,
    pub first_mark: Option<String>,
    pub start_location: Location,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            limits: Bounds::UNLIMITED,
            zoom: DEFAULT_ZOOM,
            seconds_per_display: SECONDS_PER_ADVANCE,
            speedup: 1.0,
            first_mark: None,
            start_location: Location::default(),
        }
    }
}

impl ScenarioSettings {
    /// Limits, when at least one side is set.
    pub fn configured_limits(&self) -> Option<Bounds> {
        (self.limits != Bounds::UNLIMITED).then_some(self.limits)
    }

    pub fn view(&self, title: &str, first_leg_distance: Option<f64>) -> ScenarioView {
        ScenarioView {
            title: title.to_string(),
            bounds: self.bounds,
            limits: self.configured_limits(),
            zoom: self.zoom,
            seconds_per_display: self.seconds_per_display,
            speedup: self.speedup,
            first_leg_distance,
        }
    }
}

type Field = ParamField<ScenarioSettings>;

fn schema() -> &'static ParamSchema<ScenarioSettings> {
    static SCHEMA: OnceLock<ParamSchema<ScenarioSettings>> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        ParamSchema::new(vec![
            Field::real("east", |s: &mut ScenarioSettings, v| s.bounds.east = v),
            Field::real("west", |s: &mut ScenarioSettings, v| s.bounds.west = v),
            Field::real("north", |s: &mut ScenarioSettings, v| s.bounds.north = v),
            Field::real("south", |s: &mut ScenarioSettings, v| s.bounds.south = v),
            Field::real("eastlimit", |s: &mut ScenarioSettings, v| s.limits.east = v),
            Field::real("westlimit", |s: &mut ScenarioSettings, v| s.limits.west = v),
            Field::real("northlimit", |s: &mut ScenarioSettings, v| s.limits.north = v),
            Field::real("southlimit", |s: &mut ScenarioSettings, v| s.limits.south = v),
            Field::real("zoom", |s: &mut ScenarioSettings, v| s.zoom = v),
            Field::integer("secondsperdisplay", |s: &mut ScenarioSettings, v| {
                s.seconds_per_display = v.max(1) as u32
            }),
            Field::real("speedup", |s: &mut ScenarioSettings, v| s.speedup = v),
            Field::text("firstmark", |s: &mut ScenarioSettings, v: &str| {
                s.first_mark = (!v.is_empty()).then(|| v.to_string())
            }),
            Field::location("startlocation", |s: &mut ScenarioSettings, v| {
                s.start_location = v
            }),
        ])
    })
}

impl Parameterised for ScenarioSettings {
    fn schema(&self) -> &'static ParamSchema<Self> {
        schema()
    }
}

/// Build the definition for a built-in scenario.
pub fn build_definition(id: ScenarioId) -> ScenarioDefinition {
    match id {
        ScenarioId::SingleBeat => build_single_beat(),
        ScenarioId::WindwardLeeward => build_windward_leeward(),
        ScenarioId::ShiftyFleet => build_shifty_fleet(),
    }
}

/// "Single Beat"
/// One boat, steady 10 kt northerly, a single windward mark 400 m upwind.
fn build_single_beat() -> ScenarioDefinition {
    ScenarioDefinition::new("Single Beat")
        .with_settings(&[
            ("east", "300"),
            ("west", "-300"),
            ("north", "300"),
            ("south", "-300"),
            ("zoom", "1.5"),
            ("firstmark", "windward"),
            ("startlocation", "0,-200"),
        ])
        .with_element("wind", "constantflow", &[("from", "0"), ("speed", "10")])
        .with_element(
            "windward",
            "mark",
            &[
                ("location", "0,200"),
                ("windwardlaylines", "yes"),
                ("laylinelength", "150"),
            ],
        )
        .with_element(
            "red",
            "laser2",
            &[("heading", "45"), ("colour", "red"), ("upwindtackifheaded", "yes")],
        )
}

/// "Windward/Leeward"
/// Two laps, two boats with different upwind tactics, and a 15° veer
/// after three minutes.
fn build_windward_leeward() -> ScenarioDefinition {
    let downwind = [("reachdownwind", "yes"), ("downwindgybeiflifted", "yes")];
    let boat = |colour: &'static str, start: &'static str, tactic: &'static str| {
        let mut params = vec![
            ("location", start),
            ("heading", "45"),
            ("colour", colour),
            (tactic, "yes"),
        ];
        params.extend(downwind);
        params
    };

    ScenarioDefinition::new("Windward/Leeward")
        .with_settings(&[
            ("east", "400"),
            ("west", "-400"),
            ("north", "400"),
            ("south", "-400"),
            ("eastlimit", "350"),
            ("westlimit", "-350"),
            ("secondsperdisplay", "2"),
            ("firstmark", "windward1"),
        ])
        .with_element("wind", "constantflow", &[("from", "0"), ("speed", "12")])
        .with_element("water", "constantflow", &[("from", "90"), ("speed", "0.3")])
        .with_element(
            "windward1",
            "mark",
            &[("location", "0,300"), ("nextmark", "leeward")],
        )
        .with_element(
            "leeward",
            "mark",
            &[
                ("location", "0,-250"),
                ("nextmark", "windward2"),
                ("downwindlaylines", "yes"),
                ("laylinelength", "100"),
            ],
        )
        .with_element(
            "windward2",
            "mark",
            &[("location", "0,300"), ("nextmark", "finish")],
        )
        .with_element("finish", "mark", &[("location", "0,-300"), ("colour", "yellow")])
        .with_element("blue", "laser2", &boat("blue", "-20,-300", "upwindtackifheaded"))
        .with_element("green", "laser2", &boat("green", "20,-300", "upwindsailonbesttack"))
        .with_scheduled(180, "wind", &[("from", "15")])
}

/// "Shifty Fleet"
/// Oscillating breeze with random shifts, a cross tide, three boats and
/// keys to change the breeze while running.
fn build_shifty_fleet() -> ScenarioDefinition {
    ScenarioDefinition::new("Shifty Fleet")
        .with_settings(&[
            ("east", "500"),
            ("west", "-500"),
            ("north", "500"),
            ("south", "-500"),
            ("northlimit", "480"),
            ("southlimit", "-480"),
            ("firstmark", "top"),
            ("startlocation", "0,-350"),
        ])
        .with_element(
            "wind",
            "swingingflow",
            &[
                ("meanfrom", "0"),
                ("speed", "14"),
                ("swingangle", "8"),
                ("swingperiod", "240"),
                ("shiftangle", "6"),
                ("shiftperiod", "90"),
                ("randomshifts", "yes"),
                ("showflow", "yes"),
                ("showflowinterval", "200"),
            ],
        )
        .with_element("water", "constantflow", &[("from", "270"), ("speed", "0.5")])
        .with_element(
            "top",
            "mark",
            &[
                ("location", "0,350"),
                ("windwardlaylines", "yes"),
                ("laylinelength", "200"),
                ("nextmark", "bottom"),
            ],
        )
        .with_element(
            "bottom",
            "mark",
            &[("location", "0,-300"), ("leavetoport", "no")],
        )
        .with_element(
            "red",
            "laser2",
            &[
                ("location", "-30,-350"),
                ("heading", "45"),
                ("colour", "red"),
                ("upwindtackifheaded", "yes"),
            ],
        )
        .with_element(
            "blue",
            "laser2",
            &[
                ("heading", "-45"),
                ("colour", "blue"),
                ("upwindsailonbesttack", "yes"),
            ],
        )
        .with_element(
            "orange",
            "laser2",
            &[
                ("location", "30,-350"),
                ("heading", "45"),
                ("colour", "orange"),
                ("upwindchannel", "120"),
                ("reachdownwind", "yes"),
            ],
        )
        .with_key("v", "wind", &[("meanfrom", "20")])
        .with_key("b", "wind", &[("meanfrom", "-20")])
        .with_key("s", "wind", &[("swingangle", "20")])
        .with_key("c", "red", &[("upwindchannel", "100")])
}
