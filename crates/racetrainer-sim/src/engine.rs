//! Simulation engine: the core of the race trainer.
//!
//! `SimulationEngine` owns the scenario world, processes driver commands,
//! runs the systems one simulated second at a time and produces
//! `SimSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use racetrainer_core::commands::SimCommand;
use racetrainer_core::definition::ScenarioDefinition;
use racetrainer_core::enums::{ScenarioId, SimPhase};
use racetrainer_core::error::{ScenarioErrors, SimError};
use racetrainer_core::events::SimEvent;
use racetrainer_core::params::ParamErrors;
use racetrainer_core::state::SimSnapshot;
use racetrainer_core::types::SimTime;
use racetrainer_flow::FlowField;

use crate::boat::BoatEnvironment;
use crate::mark::Course;
use crate::scenario::{self, ScenarioSettings};
use crate::systems;
use crate::world_setup::{self, InstanceRef, ScenarioWorld};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Wall-clock pacing multiplier applied on top of the scenario speedup.
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
        }
    }
}

/// The simulation engine. Owns the scenario world and all sim state.
pub struct SimulationEngine {
    definition: ScenarioDefinition,
    config: SimConfig,
    state: ScenarioWorld,
    time: SimTime,
    phase: SimPhase,
    rng: ChaCha8Rng,
    command_queue: VecDeque<SimCommand>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Load a scenario. Nothing runs until a `Start` command.
    pub fn load(definition: ScenarioDefinition, config: SimConfig) -> Result<Self, ScenarioErrors> {
        let state = world_setup::build(&definition)?;
        tracing::info!(
            title = %definition.title,
            seed = config.seed,
            elements = definition.elements.len(),
            "scenario loaded"
        );
        Ok(Self {
            definition,
            config,
            state,
            time: SimTime::default(),
            phase: SimPhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            events: Vec::new(),
        })
    }

    /// Load one of the built-in scenarios.
    pub fn from_scenario(id: ScenarioId, config: SimConfig) -> Result<Self, ScenarioErrors> {
        Self::load(scenario::build_definition(id), config)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Process queued commands and, while running, advance one display
    /// step (`secondsperdisplay` seconds). Returns the resulting snapshot.
    pub fn tick(&mut self) -> Result<SimSnapshot, SimError> {
        self.process_commands()?;

        if self.phase == SimPhase::Running {
            for _ in 0..self.state.scenario.seconds_per_display {
                self.advance()?;
            }
        }

        let events = std::mem::take(&mut self.events);
        Ok(systems::snapshot::build_snapshot(
            &self.state,
            &self.definition.title,
            &self.time,
            self.phase,
            events,
        ))
    }

    /// Advance the simulation by one second.
    pub fn advance(&mut self) -> Result<(), SimError> {
        let secs = self.time.secs;

        // 1. Scheduled overrides for this second
        self.apply_scheduled(secs)?;
        // 2. Flow perturbations
        self.state.water.advance(secs, &mut self.rng);
        self.state.wind.advance(secs, &mut self.rng);
        // 3. Mark laylines
        systems::marks::run(&mut self.state.world, &self.state.wind);
        // 4. Boats
        let course = Course::from_world(&self.state.world);
        let env = BoatEnvironment {
            wind: &self.state.wind,
            water: &self.state.water,
            limits: self.state.scenario.limits,
            course: &course,
        };
        systems::boats::run(&mut self.state.world, &env, secs, &mut self.events)?;

        self.time.advance();
        Ok(())
    }

    /// Apply the parameters bound to `key`. Unbound keys are ignored.
    pub fn process_key(&mut self, key: &str) -> Result<(), SimError> {
        let bindings: Vec<_> = self
            .definition
            .key_bindings
            .iter()
            .filter(|binding| binding.key == key)
            .map(|binding| binding.target.clone())
            .collect();
        for target in bindings {
            let mut errors = ParamErrors::new();
            self.state.apply_override(&target, &mut errors);
            if !errors.is_empty() {
                return Err(SimError::KeyBindingFailed {
                    key: key.to_string(),
                    messages: errors.messages().to_vec(),
                });
            }
            tracing::debug!(key, instance = %target.instance, "key binding applied");
            self.events.push(SimEvent::KeyApplied {
                key: key.to_string(),
                instance: target.instance,
            });
        }
        Ok(())
    }

    /// Discard everything and rebuild from the definition. The RNG is
    /// reseeded so a reset run replays the first one exactly.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.finish();
        self.state = world_setup::build(&self.definition)?;
        self.time = SimTime::default();
        self.phase = SimPhase::Ready;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.events.clear();
        tracing::info!(title = %self.definition.title, "simulation reset");
        Ok(())
    }

    /// Tear down: clear every boat's legs and despawn all marks and boats.
    pub fn finish(&mut self) {
        systems::boats::clear_legs(&mut self.state.world);
        self.state.world.clear();
    }

    /// Resolve an instance name (`wind`, `water`, a mark or a boat).
    pub fn find(&self, name: &str) -> Option<InstanceRef> {
        self.state.find(name)
    }

    /// Snapshot of the current state without consuming pending events.
    pub fn snapshot(&self) -> SimSnapshot {
        systems::snapshot::build_snapshot(
            &self.state,
            &self.definition.title,
            &self.time,
            self.phase,
            self.events.clone(),
        )
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    pub fn definition(&self) -> &ScenarioDefinition {
        &self.definition
    }

    pub fn scenario(&self) -> &ScenarioSettings {
        &self.state.scenario
    }

    pub fn wind(&self) -> &FlowField {
        &self.state.wind
    }

    pub fn water(&self) -> &FlowField {
        &self.state.water
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.state.world
    }

    fn process_commands(&mut self) -> Result<(), SimError> {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command)?;
        }
        Ok(())
    }

    fn handle_command(&mut self, command: SimCommand) -> Result<(), SimError> {
        match command {
            SimCommand::Start => {
                if self.phase == SimPhase::Ready {
                    self.phase = SimPhase::Running;
                    tracing::info!(title = %self.definition.title, "simulation started");
                }
            }
            SimCommand::Pause => {
                if self.phase == SimPhase::Running {
                    self.phase = SimPhase::Paused;
                }
            }
            SimCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Running;
                }
            }
            SimCommand::Reset => self.reset()?,
            SimCommand::Key { key } => self.process_key(&key)?,
        }
        Ok(())
    }

    fn apply_scheduled(&mut self, secs: u32) -> Result<(), SimError> {
        let due: Vec<_> = self
            .definition
            .scheduled
            .iter()
            .filter(|scheduled| scheduled.secs == secs)
            .map(|scheduled| scheduled.target.clone())
            .collect();
        for target in due {
            let mut errors = ParamErrors::new();
            self.state.apply_override(&target, &mut errors);
            if !errors.is_empty() {
                return Err(SimError::OverrideFailed {
                    secs,
                    messages: errors.messages().to_vec(),
                });
            }
            tracing::debug!(secs, instance = %target.instance, "scheduled override applied");
            self.events.push(SimEvent::OverrideApplied {
                instance: target.instance,
                secs,
            });
        }
        Ok(())
    }
}
