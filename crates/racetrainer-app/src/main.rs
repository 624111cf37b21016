use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use racetrainer_app::game_loop::run_length_secs;
use racetrainer_app::state::{DriverError, SimHandle};
use racetrainer_core::commands::SimCommand;
use racetrainer_core::enums::ScenarioId;
use racetrainer_core::state::SimSnapshot;
use racetrainer_sim::{SimConfig, SimulationEngine};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    SingleBeat,
    WindwardLeeward,
    ShiftyFleet,
}

impl From<Scenario> for ScenarioId {
    fn from(scenario: Scenario) -> Self {
        match scenario {
            Scenario::SingleBeat => ScenarioId::SingleBeat,
            Scenario::WindwardLeeward => ScenarioId::WindwardLeeward,
            Scenario::ShiftyFleet => ScenarioId::ShiftyFleet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "racetrainer", about = "Headless sail-boat race training simulator")]
struct Args {
    /// Built-in scenario to run
    #[arg(long, value_enum, default_value = "single-beat")]
    scenario: Scenario,
    /// RNG seed (same seed, same run)
    #[arg(long, default_value = "42")]
    seed: u64,
    /// Number of display ticks to run
    #[arg(long, default_value = "300")]
    ticks: u32,
    /// Speed multiplier on top of the scenario speedup (1.0 = real time)
    #[arg(long, default_value = "1.0")]
    speed: f64,
    /// Keys to press once the clock starts
    #[arg(long = "key")]
    keys: Vec<String>,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("warn,racetrainer_sim=info,racetrainer_app=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = SimConfig {
        seed: args.seed,
        time_scale: args.speed,
    };
    let engine = match SimulationEngine::from_scenario(args.scenario.into(), config) {
        Ok(engine) => engine,
        Err(errors) => {
            error!("{}", errors);
            return ExitCode::FAILURE;
        }
    };
    let target_secs = run_length_secs(args.ticks, engine.scenario().seconds_per_display);

    match run(engine, &args, target_secs) {
        Ok(snapshot) => {
            report(&snapshot, args.json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

/// Start the clock, press any keys, and wait until `target_secs` have run.
fn run(
    engine: SimulationEngine,
    args: &Args,
    target_secs: u32,
) -> Result<SimSnapshot, DriverError> {
    let handle = SimHandle::start(engine)?;
    handle.send(SimCommand::Start)?;
    for key in &args.keys {
        handle.press_key(key)?;
    }
    info!(scenario = ?args.scenario, target_secs, "running");

    loop {
        if let Some(snapshot) = handle.latest_snapshot() {
            if snapshot.time.secs >= target_secs {
                handle.shutdown()?;
                return Ok(snapshot);
            }
        }
        if handle.is_finished() {
            // The loop stopped early; shutdown reports why.
            handle.shutdown()?;
            return Err(DriverError::Disconnected);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn report(snapshot: &SimSnapshot, json: bool) {
    if json {
        match serde_json::to_string_pretty(snapshot) {
            Ok(text) => println!("{}", text),
            Err(err) => error!(error = %err, "failed to serialize snapshot"),
        }
        return;
    }
    println!(
        "{}  {}  wind {:>4}° {:.1} kt",
        snapshot.scenario.title,
        snapshot.clock,
        snapshot.wind.mean.from.degrees(),
        snapshot.wind.mean.knots
    );
    for boat in &snapshot.boats {
        let next = boat.next_mark.as_deref().unwrap_or("-");
        let distance = boat
            .distance_to_mark
            .map_or_else(|| "-".to_string(), |d| format!("{:.0} m", d));
        println!(
            "  {:<8} ({:>7.1}, {:>7.1})  hdg {:>4}°  {:>4.2} m/s  {:?} {:?}  next {} {}",
            boat.name,
            boat.position.x,
            boat.position.y,
            boat.heading,
            boat.speed,
            boat.mode,
            boat.tack,
            next,
            distance
        );
    }
}
