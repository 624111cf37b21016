//! Building a simulation world from a scenario definition.
//!
//! Loading runs in a fixed order: scenario settings, water, wind, then
//! marks and boats in definition order. The course graph, first legs and
//! every scheduled override and key binding are validated before anything
//! runs. All problems are collected; any problem refuses the load.

use std::collections::HashSet;

use hecs::{Entity, World};

use racetrainer_core::constants::*;
use racetrainer_core::definition::{Override, ScenarioDefinition};
use racetrainer_core::error::ScenarioErrors;
use racetrainer_core::params::{ParamErrors, Parameterised};
use racetrainer_core::types::{Bounds, Flow};
use racetrainer_flow::FlowField;
use racetrainer_tactics::profiles::get_profile;

use crate::boat::Boat;
use crate::components::Instance;
use crate::mark::{Course, Mark};
use crate::registry::{self, ElementKind};
use crate::scenario::ScenarioSettings;

/// A named element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRef {
    Wind,
    Water,
    Mark(Entity),
    Boat(Entity),
}

/// Scenario settings, both flow fields and the world of marks and boats.
pub struct ScenarioWorld {
    pub scenario: ScenarioSettings,
    pub wind: FlowField,
    pub water: FlowField,
    pub world: World,
}

impl ScenarioWorld {
    /// Resolve an instance name.
    pub fn find(&self, name: &str) -> Option<InstanceRef> {
        match name {
            WIND_INSTANCE => return Some(InstanceRef::Wind),
            WATER_INSTANCE => return Some(InstanceRef::Water),
            _ => {}
        }
        let entity = self
            .world
            .query::<&Instance>()
            .iter()
            .find(|(_, instance)| instance.name == name)
            .map(|(entity, _)| entity)?;
        if self.world.get::<&Mark>(entity).is_ok() {
            Some(InstanceRef::Mark(entity))
        } else if self.world.get::<&Boat>(entity).is_ok() {
            Some(InstanceRef::Boat(entity))
        } else {
            None
        }
    }

    /// Validate an override against its target without changing anything.
    pub fn check_override(&self, target: &Override, errors: &mut ParamErrors) {
        let name = target.instance.as_str();
        match self.find(name) {
            None => errors.missing_instance(name),
            Some(InstanceRef::Wind) => self.wind.check_parameters(name, &target.params, errors),
            Some(InstanceRef::Water) => self.water.check_parameters(name, &target.params, errors),
            Some(InstanceRef::Mark(entity)) => {
                if let Ok(mark) = self.world.get::<&Mark>(entity) {
                    mark.check_parameters(name, &target.params, errors);
                }
            }
            Some(InstanceRef::Boat(entity)) => {
                if let Ok(boat) = self.world.get::<&Boat>(entity) {
                    boat.check_parameters(name, &target.params, errors);
                }
            }
        }
    }

    /// Apply an override to its target.
    pub fn apply_override(&mut self, target: &Override, errors: &mut ParamErrors) {
        let name = target.instance.as_str();
        match self.find(name) {
            None => errors.missing_instance(name),
            Some(InstanceRef::Wind) => self.wind.set_parameters(name, &target.params, errors),
            Some(InstanceRef::Water) => self.water.set_parameters(name, &target.params, errors),
            Some(InstanceRef::Mark(entity)) => {
                if let Ok(mut mark) = self.world.get::<&mut Mark>(entity) {
                    mark.set_parameters(name, &target.params, errors);
                }
            }
            Some(InstanceRef::Boat(entity)) => {
                if let Ok(mut boat) = self.world.get::<&mut Boat>(entity) {
                    boat.set_parameters(name, &target.params, errors);
                }
            }
        }
    }

    /// Distance from the start location to the first mark.
    pub fn first_leg_distance(&self) -> Option<f64> {
        let first = self.scenario.first_mark.as_deref()?;
        match self.find(first)? {
            InstanceRef::Mark(entity) => self
                .world
                .get::<&Mark>(entity)
                .ok()
                .map(|mark| self.scenario.start_location.distance_to(&mark.location)),
            _ => None,
        }
    }
}

/// Build and validate a world from `definition`.
pub fn build(definition: &ScenarioDefinition) -> Result<ScenarioWorld, ScenarioErrors> {
    let mut errors = ParamErrors::new();

    // 1. Scenario settings
    let mut scenario = ScenarioSettings::default();
    scenario.set_parameters(SCENARIO_INSTANCE, &definition.scenario, &mut errors);

    // 2. Water, still unless defined
    let water = build_flow(
        definition,
        WATER_INSTANCE,
        scenario.bounds,
        Flow::default(),
        &mut errors,
    );

    // 3. Wind, a steady northerly unless defined
    let wind = build_flow(
        definition,
        WIND_INSTANCE,
        scenario.bounds,
        Flow::from_degrees(0.0, DEFAULT_WIND_KNOTS),
        &mut errors,
    );

    // 4. Marks and boats
    let mut world = World::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for (ordinal, element) in definition.elements.iter().enumerate() {
        let name = element.name.as_str();
        let is_flow = name == WIND_INSTANCE || name == WATER_INSTANCE;
        if name == SCENARIO_INSTANCE || !seen.insert(name) {
            errors.push(format!("duplicate instance ({})", name));
            continue;
        }
        if is_flow {
            // Built above from the first definition.
            continue;
        }
        let instance = Instance::new(name, ordinal as u32);
        match registry::lookup(&element.class) {
            None => errors.push(format!(
                "unknown class ({}) for instance ({})",
                element.class, name
            )),
            Some(ElementKind::Flow(_)) => errors.push(format!(
                "flow class ({}) can only be used for wind or water ({})",
                element.class, name
            )),
            Some(ElementKind::Mark) => {
                let mut mark = Mark::default();
                mark.set_parameters(name, &element.params, &mut errors);
                mark.update_layline_base(wind.flow_at(mark.location).from);
                world.spawn((instance, mark));
            }
            Some(ElementKind::Boat(class)) => {
                if let Err(err) = get_profile(class).table.validate() {
                    errors.push(format!(
                        "performance table for class ({}) is invalid: {}",
                        element.class, err
                    ));
                    continue;
                }
                let mut boat = Boat::new(class, scenario.start_location);
                boat.set_parameters(name, &element.params, &mut errors);
                world.spawn((instance, boat));
            }
        }
    }

    // 5. Course graph
    let course = Course::from_world(&world);
    if let Some(first) = &scenario.first_mark {
        if !course.contains(first) {
            errors.push(format!("firstmark refers to unknown mark ({})", first));
        }
    }
    for (_, (instance, mark)) in world.query::<(&Instance, &Mark)>().iter() {
        if let Some(next) = &mark.next_mark {
            if !course.contains(next) {
                errors.push(format!(
                    "nextmark refers to unknown mark ({}.nextmark={})",
                    instance.name, next
                ));
            }
        }
    }

    // 6. First legs
    if errors.is_empty() {
        for (_, (instance, boat)) in world.query_mut::<(&Instance, &mut Boat)>() {
            if let Err(err) = boat.start_leg(&instance.name, scenario.first_mark.clone(), &course)
            {
                errors.push(err.to_string());
            }
        }
    }

    // 7. Scheduled overrides and key bindings
    let loaded = ScenarioWorld {
        scenario,
        wind,
        water,
        world,
    };
    for scheduled in &definition.scheduled {
        loaded.check_override(&scheduled.target, &mut errors);
    }
    for binding in &definition.key_bindings {
        loaded.check_override(&binding.target, &mut errors);
    }

    for message in errors.messages() {
        tracing::warn!("{}", message);
    }
    errors.into_result()?;
    Ok(loaded)
}

fn build_flow(
    definition: &ScenarioDefinition,
    name: &str,
    bounds: Bounds,
    default: Flow,
    errors: &mut ParamErrors,
) -> FlowField {
    let Some(element) = definition.element(name) else {
        return FlowField::constant(bounds, default);
    };
    match registry::lookup(&element.class) {
        Some(ElementKind::Flow(variant)) => {
            let mut field = FlowField::new(variant, bounds);
            field.set_parameters(name, &element.params, errors);
            field
        }
        _ => {
            errors.push(format!(
                "{} needs a flow class, got ({})",
                name, element.class
            ));
            FlowField::constant(bounds, default)
        }
    }
}
