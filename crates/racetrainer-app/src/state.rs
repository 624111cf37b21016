//! Driver state shared between the caller and the sim loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use thiserror::Error;

use racetrainer_core::commands::SimCommand;
use racetrainer_core::error::SimError;
use racetrainer_core::state::SimSnapshot;
use racetrainer_sim::SimulationEngine;

use crate::game_loop;

/// Messages sent from the handle to the sim loop thread.
#[derive(Debug)]
pub enum DriverCommand {
    /// A command to forward to the simulation engine.
    Sim(SimCommand),
    /// Stop the sim loop thread gracefully.
    Shutdown,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn sim loop: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("sim loop has stopped")]
    Disconnected,
    #[error("sim loop panicked")]
    Panicked,
    #[error(transparent)]
    Sim(#[from] SimError),
}

pub type SharedSnapshot = Arc<Mutex<Option<SimSnapshot>>>;

/// Handle to one running simulation. Input layers hold this instead of
/// reaching for a global.
pub struct SimHandle {
    command_tx: mpsc::Sender<DriverCommand>,
    latest_snapshot: SharedSnapshot,
    thread: JoinHandle<Result<(), SimError>>,
}

impl SimHandle {
    /// Move `engine` onto its own thread and start pacing it.
    pub fn start(engine: SimulationEngine) -> Result<Self, DriverError> {
        let latest_snapshot: SharedSnapshot = Arc::new(Mutex::new(None));
        let (command_tx, thread) = game_loop::spawn_sim_loop(engine, latest_snapshot.clone())?;
        Ok(Self {
            command_tx,
            latest_snapshot,
            thread,
        })
    }

    pub fn send(&self, command: SimCommand) -> Result<(), DriverError> {
        self.command_tx
            .send(DriverCommand::Sim(command))
            .map_err(|_| DriverError::Disconnected)
    }

    pub fn press_key(&self, key: &str) -> Result<(), DriverError> {
        self.send(SimCommand::Key {
            key: key.to_string(),
        })
    }

    /// Copy of the most recent snapshot, if a tick has run.
    pub fn latest_snapshot(&self) -> Option<SimSnapshot> {
        self.latest_snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the sim loop thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop the loop and wait for it. Returns the error that stopped the
    /// loop, if any. Dropping the handle instead also stops the loop, since
    /// the channel disconnects.
    pub fn shutdown(self) -> Result<(), DriverError> {
        // The loop may already have stopped on an error; joining reports it.
        let _ = self.command_tx.send(DriverCommand::Shutdown);
        let result = self.thread.join().map_err(|_| DriverError::Panicked)?;
        result.map_err(DriverError::from)
    }
}
