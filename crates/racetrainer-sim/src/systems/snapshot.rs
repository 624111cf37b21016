//! Snapshot system: reads the scenario world and builds a `SimSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use racetrainer_core::enums::SimPhase;
use racetrainer_core::events::SimEvent;
use racetrainer_core::state::{BoatView, MarkView, SimSnapshot};
use racetrainer_core::types::SimTime;
use racetrainer_flow::FlowField;

use crate::boat::Boat;
use crate::components::Instance;
use crate::mark::{Course, Mark};
use crate::world_setup::ScenarioWorld;

/// Build a complete snapshot of the current state.
pub fn build_snapshot(
    state: &ScenarioWorld,
    title: &str,
    time: &SimTime,
    phase: SimPhase,
    events: Vec<SimEvent>,
) -> SimSnapshot {
    let course = Course::from_world(&state.world);
    SimSnapshot {
        time: *time,
        clock: time.clock(),
        phase,
        scenario: state.scenario.view(title, state.first_leg_distance()),
        wind: state.wind.view(),
        water: state.water.view(),
        marks: build_marks(&state.world, &state.wind),
        boats: build_boats(&state.world, &state.wind, &course),
        events,
    }
}

/// Marks in definition order.
fn build_marks(world: &World, wind: &FlowField) -> Vec<MarkView> {
    let mut marks: Vec<(u32, MarkView)> = world
        .query::<(&Instance, &Mark)>()
        .iter()
        .map(|(_, (instance, mark))| {
            let direction = wind.flow_at(mark.location).from;
            (instance.ordinal, mark.view(&instance.name, direction))
        })
        .collect();
    marks.sort_by_key(|(ordinal, _)| *ordinal);
    marks.into_iter().map(|(_, view)| view).collect()
}

/// Boats in definition order.
fn build_boats(world: &World, wind: &FlowField, course: &Course) -> Vec<BoatView> {
    let mut boats: Vec<(u32, BoatView)> = world
        .query::<(&Instance, &Boat)>()
        .iter()
        .map(|(_, (instance, boat))| (instance.ordinal, boat.view(&instance.name, wind, course)))
        .collect();
    boats.sort_by_key(|(ordinal, _)| *ordinal);
    boats.into_iter().map(|(_, view)| view).collect()
}
