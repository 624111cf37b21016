//! Boat system: one second of sailing for every boat.
//!
//! Boats never interact, but they are advanced in definition order so the
//! events of a second are reported in a stable order.

use hecs::World;

use racetrainer_core::error::SimError;
use racetrainer_core::events::SimEvent;

use crate::boat::{Boat, BoatEnvironment};
use crate::components::Instance;

/// Advance every boat by one second, collecting events. Stops at the
/// first broken invariant.
pub fn run(
    world: &mut World,
    env: &BoatEnvironment,
    secs: u32,
    events: &mut Vec<SimEvent>,
) -> Result<(), SimError> {
    let mut boats: Vec<(&Instance, &mut Boat)> = world
        .query_mut::<(&Instance, &mut Boat)>()
        .into_iter()
        .map(|(_, pair)| pair)
        .collect();
    boats.sort_by_key(|(instance, _)| instance.ordinal);

    for (instance, boat) in boats {
        if let Some(event) = boat.advance(&instance.name, env, secs)? {
            events.push(event);
        }
    }
    Ok(())
}

/// Clear every boat's legs.
pub fn clear_legs(world: &mut World) {
    for (_entity, boat) in world.query_mut::<&mut Boat>() {
        boat.clear_legs();
        boat.track.clear();
    }
}
