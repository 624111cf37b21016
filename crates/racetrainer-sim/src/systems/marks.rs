//! Mark system: keeps layline bases square to the wind at each mark.

use hecs::World;

use racetrainer_flow::FlowField;

use crate::mark::Mark;

pub fn run(world: &mut World, wind: &FlowField) {
    for (_entity, mark) in world.query_mut::<&mut Mark>() {
        let direction = wind.flow_at(mark.location).from;
        mark.update_layline_base(direction);
    }
}
