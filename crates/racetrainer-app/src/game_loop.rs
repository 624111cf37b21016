//! Sim loop thread: paces the engine against the wall clock and publishes
//! snapshots.
//!
//! The engine moves into this thread. Commands arrive via `mpsc` channel;
//! each tick's snapshot replaces the shared latest snapshot for polling.
//! A `SimError` stops the loop and is returned from the thread.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use racetrainer_core::error::SimError;
use racetrainer_core::events::SimEvent;
use racetrainer_sim::SimulationEngine;

use crate::state::{DriverCommand, SharedSnapshot};

/// Wall-clock duration of one simulated second at 1x.
const SIM_SECOND: Duration = Duration::from_secs(1);

/// Wall-clock time between ticks: one display step of
/// `seconds_per_display` simulated seconds, sped up by the scenario and
/// the driver.
pub fn tick_interval(seconds_per_display: u32, speedup: f64, time_scale: f64) -> Duration {
    let step = SIM_SECOND * seconds_per_display.max(1);
    let rate = speedup * time_scale;
    if rate > 0.001 {
        step.div_f64(rate)
    } else {
        step
    }
}

/// Simulated seconds covered by `ticks` display steps, saturating at the
/// clock's range.
pub fn run_length_secs(ticks: u32, seconds_per_display: u32) -> u32 {
    ticks.saturating_mul(seconds_per_display)
}

/// Spawns the sim loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_sim_loop(
    engine: SimulationEngine,
    latest_snapshot: SharedSnapshot,
) -> std::io::Result<(mpsc::Sender<DriverCommand>, JoinHandle<Result<(), SimError>>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<DriverCommand>();

    let thread = std::thread::Builder::new()
        .name("racetrainer-sim-loop".into())
        .spawn(move || run_sim_loop(engine, cmd_rx, &latest_snapshot))?;

    Ok((cmd_tx, thread))
}

/// Runs until Shutdown, channel disconnect or a failed tick.
fn run_sim_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<DriverCommand>,
    latest_snapshot: &SharedSnapshot,
) -> Result<(), SimError> {
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(DriverCommand::Sim(cmd)) => engine.queue_command(cmd),
                Ok(DriverCommand::Shutdown) => return shut_down(&mut engine),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return shut_down(&mut engine),
            }
        }

        // 2. Advance one display step (the engine handles pause itself)
        let snapshot = match engine.tick() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(error = %err, secs = engine.time().secs, "tick failed, stopping");
                return Err(err);
            }
        };
        for event in &snapshot.events {
            log_event(event);
        }

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next tick
        let settings = engine.scenario();
        let interval = tick_interval(
            settings.seconds_per_display,
            settings.speedup,
            engine.time_scale(),
        );
        next_tick_time += interval;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > interval * 2 {
            // Too far behind; don't try to catch up.
            next_tick_time = now;
        }
    }
}

fn shut_down(engine: &mut SimulationEngine) -> Result<(), SimError> {
    engine.finish();
    tracing::info!(secs = engine.time().secs, "sim loop stopped");
    Ok(())
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::MarkRounded { boat, mark, secs } => {
            tracing::info!(boat = %boat, mark = %mark, secs, "mark rounded")
        }
        SimEvent::BoatStopped { boat, secs } => {
            tracing::info!(boat = %boat, secs, "boat finished course")
        }
        SimEvent::OverrideApplied { instance, secs } => {
            tracing::info!(instance = %instance, secs, "scheduled change applied")
        }
        SimEvent::KeyApplied { key, instance } => {
            tracing::info!(key = %key, instance = %instance, "key applied")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrainer_core::commands::SimCommand;
    use racetrainer_core::enums::{ScenarioId, SimPhase};
    use racetrainer_sim::SimConfig;

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<DriverCommand>();

        tx.send(DriverCommand::Sim(SimCommand::Start)).unwrap();
        tx.send(DriverCommand::Sim(SimCommand::Pause)).unwrap();
        tx.send(DriverCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DriverCommand::Sim(SimCommand::Start)));
        assert!(matches!(commands[1], DriverCommand::Sim(SimCommand::Pause)));
        assert!(matches!(commands[2], DriverCommand::Shutdown));
    }

    #[test]
    fn test_tick_interval() {
        assert_eq!(tick_interval(1, 1.0, 1.0), Duration::from_secs(1));
        assert_eq!(tick_interval(2, 1.0, 1.0), Duration::from_secs(2));
        assert_eq!(tick_interval(1, 4.0, 2.5), Duration::from_millis(100));
        // A zero rate falls back to real time.
        assert_eq!(tick_interval(1, 0.0, 1.0), Duration::from_secs(1));
    }

    #[test]
    fn test_run_length_saturates() {
        assert_eq!(run_length_secs(300, 1), 300);
        assert_eq!(run_length_secs(300, 3), 900);
        assert_eq!(run_length_secs(u32::MAX, 3), u32::MAX);
    }

    #[test]
    fn test_pause_resume_via_commands() {
        let mut engine =
            SimulationEngine::from_scenario(ScenarioId::SingleBeat, SimConfig::default()).unwrap();

        engine.queue_command(SimCommand::Start);
        let snap = engine.tick().unwrap();
        assert_eq!(snap.phase, SimPhase::Running);

        engine.queue_command(SimCommand::Pause);
        let snap = engine.tick().unwrap();
        assert_eq!(snap.phase, SimPhase::Paused);
        let paused_secs = snap.time.secs;

        // Tick while paused: time should not advance
        let snap = engine.tick().unwrap();
        assert_eq!(snap.time.secs, paused_secs);

        engine.queue_command(SimCommand::Resume);
        let snap = engine.tick().unwrap();
        assert_eq!(snap.phase, SimPhase::Running);
        assert!(snap.time.secs > paused_secs);
    }

    #[test]
    fn test_snapshot_serialization_is_fast() {
        let mut engine =
            SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, SimConfig::default()).unwrap();
        engine.queue_command(SimCommand::Start);
        for _ in 0..50 {
            engine.tick().unwrap();
        }

        let snapshot = engine.tick().unwrap();
        let start = Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(20),
            "Snapshot serialization took {:?}",
            elapsed
        );
        assert!(!json.is_empty());
    }
}
