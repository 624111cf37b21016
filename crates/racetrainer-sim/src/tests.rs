//! Tests for loading, the per-second pipeline, boats, marks and the engine
//! lifecycle.

use racetrainer_core::commands::SimCommand;
use racetrainer_core::definition::ScenarioDefinition;
use racetrainer_core::enums::*;
use racetrainer_core::events::SimEvent;
use racetrainer_core::state::SimSnapshot;
use racetrainer_core::types::{Direction, Location};

use crate::boat::Boat;
use crate::engine::{SimConfig, SimulationEngine};
use crate::mark::Mark;
use crate::scenario::{self, ScenarioSettings};
use crate::world_setup::InstanceRef;

fn load(definition: ScenarioDefinition) -> SimulationEngine {
    SimulationEngine::load(definition, SimConfig::default()).expect("scenario should load")
}

fn load_errors(definition: ScenarioDefinition) -> Vec<String> {
    match SimulationEngine::load(definition, SimConfig::default()) {
        Ok(_) => panic!("scenario should be rejected"),
        Err(errors) => errors.0,
    }
}

fn northerly() -> ScenarioDefinition {
    ScenarioDefinition::new("test")
        .with_element("wind", "constantflow", &[("from", "0"), ("speed", "10")])
}

fn boat<'a>(snapshot: &'a SimSnapshot, name: &str) -> &'a racetrainer_core::state::BoatView {
    snapshot
        .boats
        .iter()
        .find(|b| b.name == name)
        .unwrap_or_else(|| panic!("boat {name} missing from snapshot"))
}

fn run_ticks(engine: &mut SimulationEngine, ticks: usize) -> Vec<SimSnapshot> {
    (0..ticks)
        .map(|_| engine.tick().expect("tick should succeed"))
        .collect()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let config = SimConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, config).unwrap();
    let mut engine_b = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, config).unwrap();
    engine_a.queue_command(SimCommand::Start);
    engine_b.queue_command(SimCommand::Start);

    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick().unwrap()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick().unwrap()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::from_scenario(
        ScenarioId::ShiftyFleet,
        SimConfig {
            seed: 111,
            ..Default::default()
        },
    )
    .unwrap();
    let mut engine_b = SimulationEngine::from_scenario(
        ScenarioId::ShiftyFleet,
        SimConfig {
            seed: 222,
            ..Default::default()
        },
    )
    .unwrap();
    engine_a.queue_command(SimCommand::Start);
    engine_b.queue_command(SimCommand::Start);

    // Random shifts only fire occasionally, so give them time.
    let mut diverged = false;
    for _ in 0..1000 {
        let json_a = serde_json::to_string(&engine_a.tick().unwrap()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick().unwrap()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Built-in scenarios ----

#[test]
fn test_builtin_scenarios_load() {
    for id in [
        ScenarioId::SingleBeat,
        ScenarioId::WindwardLeeward,
        ScenarioId::ShiftyFleet,
    ] {
        let result = SimulationEngine::from_scenario(id, SimConfig::default());
        assert!(result.is_ok(), "{:?} failed to load: {:?}", id, result.err());
    }
}

#[test]
fn test_builtin_scenarios_run() {
    for id in [
        ScenarioId::SingleBeat,
        ScenarioId::WindwardLeeward,
        ScenarioId::ShiftyFleet,
    ] {
        let mut engine = SimulationEngine::from_scenario(id, SimConfig::default()).unwrap();
        engine.queue_command(SimCommand::Start);
        for _ in 0..400 {
            if let Err(err) = engine.tick() {
                panic!("{:?} failed while running: {}", id, err);
            }
        }
    }
}

#[test]
fn test_scenario_settings_defaults() {
    let settings = ScenarioSettings::default();
    assert_eq!(settings.bounds.east, 500.0);
    assert_eq!(settings.bounds.west, -500.0);
    assert_eq!(settings.seconds_per_display, 1);
    assert!(settings.first_mark.is_none());
    assert!(settings.configured_limits().is_none());
}

// ---- Loading ----

#[test]
fn test_defaults_without_wind_or_water() {
    let engine = load(ScenarioDefinition::new("empty"));
    let wind = engine.wind().mean_flow();
    assert_eq!(wind.from.degrees(), 0);
    assert_eq!(wind.knots, 10.0);
    assert_eq!(engine.water().mean_flow().knots, 0.0);
}

#[test]
fn test_boat_defaults_to_start_location() {
    let engine = load(
        northerly()
            .with_settings(&[("startlocation", "10,-50")])
            .with_element("red", "laser2", &[]),
    );
    let snapshot = engine.snapshot();
    let red = boat(&snapshot, "red");
    assert_eq!(red.position, Location::new(10.0, -50.0));
    assert_eq!(red.mode, SailingMode::SailOn);
    assert!(red.next_mark.is_none());
}

#[test]
fn test_first_leg_assigned_on_load() {
    let engine = load(
        northerly()
            .with_settings(&[("firstmark", "a")])
            .with_element("a", "mark", &[("location", "0,100"), ("nextmark", "b")])
            .with_element("b", "mark", &[("location", "0,-100")])
            .with_element("red", "laser2", &[]),
    );
    let snapshot = engine.snapshot();
    let red = boat(&snapshot, "red");
    assert_eq!(red.next_mark.as_deref(), Some("a"));
    assert_eq!(red.following_mark.as_deref(), Some("b"));
    assert_eq!(red.distance_to_mark, Some(100.0));
    assert_eq!(snapshot.scenario.first_leg_distance, Some(100.0));
}

#[test]
fn test_unknown_class_rejected() {
    let errors = load_errors(northerly().with_element("red", "laser99", &[]));
    assert_eq!(errors, vec!["unknown class (laser99) for instance (red)"]);
}

#[test]
fn test_flow_class_outside_wind_rejected() {
    let errors = load_errors(northerly().with_element("gust", "constantflow", &[]));
    assert_eq!(
        errors,
        vec!["flow class (constantflow) can only be used for wind or water (gust)"]
    );
}

#[test]
fn test_wind_needs_flow_class() {
    let errors = load_errors(ScenarioDefinition::new("bad").with_element("wind", "mark", &[]));
    assert_eq!(errors, vec!["wind needs a flow class, got (mark)"]);
}

#[test]
fn test_duplicate_instance_rejected() {
    let errors = load_errors(
        northerly()
            .with_element("a", "mark", &[])
            .with_element("a", "laser2", &[]),
    );
    assert_eq!(errors, vec!["duplicate instance (a)"]);
}

#[test]
fn test_second_wind_or_water_rejected() {
    let errors = load_errors(northerly().with_element("wind", "constantflow", &[("from", "90")]));
    assert_eq!(errors, vec!["duplicate instance (wind)"]);

    let errors = load_errors(
        northerly()
            .with_element("water", "constantflow", &[])
            .with_element("water", "constantflow", &[]),
    );
    assert_eq!(errors, vec!["duplicate instance (water)"]);
}

#[test]
fn test_unknown_marks_rejected() {
    let errors = load_errors(
        northerly()
            .with_settings(&[("firstmark", "nowhere")])
            .with_element("a", "mark", &[("nextmark", "gone")]),
    );
    assert_eq!(
        errors,
        vec![
            "firstmark refers to unknown mark (nowhere)",
            "nextmark refers to unknown mark (a.nextmark=gone)",
        ]
    );
}

#[test]
fn test_parameter_errors_collected() {
    let errors = load_errors(
        northerly()
            .with_element("a", "mark", &[("location", "north"), ("size", "3")])
            .with_element("red", "laser2", &[("heading", "lots")]),
    );
    assert_eq!(errors.len(), 3, "every problem reported: {:?}", errors);
    assert!(errors.iter().any(|e| e.contains("a.location=north")));
    assert!(errors.iter().any(|e| e.contains("a.size=3")));
    assert!(errors.iter().any(|e| e.contains("red.heading=lots")));
}

#[test]
fn test_overrides_and_keys_validated_on_load() {
    let errors = load_errors(
        northerly()
            .with_element("red", "laser2", &[])
            .with_scheduled(30, "blue", &[("heading", "10")])
            .with_key("x", "red", &[("warp", "9")]),
    );
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors[0].contains("blue"), "missing instance reported: {}", errors[0]);
    assert!(errors[1].contains("red.warp=9"), "bad key reported: {}", errors[1]);
}

// ---- Lookup ----

#[test]
fn test_find_instances() {
    let engine = load(
        northerly()
            .with_element("a", "mark", &[])
            .with_element("red", "laser2", &[]),
    );
    assert_eq!(engine.find("wind"), Some(InstanceRef::Wind));
    assert_eq!(engine.find("water"), Some(InstanceRef::Water));
    assert!(matches!(engine.find("a"), Some(InstanceRef::Mark(_))));
    assert!(matches!(engine.find("red"), Some(InstanceRef::Boat(_))));
    assert_eq!(engine.find("scenario"), None);
    assert_eq!(engine.find("blue"), None);
}

// ---- Lifecycle ----

#[test]
fn test_ready_until_started() {
    let mut engine = load(northerly().with_element("red", "laser2", &[("heading", "90")]));
    let snapshots = run_ticks(&mut engine, 5);
    assert!(snapshots.iter().all(|s| s.phase == SimPhase::Ready));
    assert_eq!(engine.time().secs, 0);
    assert_eq!(boat(&snapshots[4], "red").position, Location::default());
}

#[test]
fn test_pause_resume() {
    let mut engine = load(northerly().with_element("red", "laser2", &[("heading", "90")]));
    engine.queue_command(SimCommand::Start);
    run_ticks(&mut engine, 10);
    assert_eq!(engine.time().secs, 10);

    engine.queue_command(SimCommand::Pause);
    let paused = run_ticks(&mut engine, 10);
    assert_eq!(engine.time().secs, 10, "clock should not advance while paused");
    assert_eq!(paused[9].phase, SimPhase::Paused);

    engine.queue_command(SimCommand::Resume);
    run_ticks(&mut engine, 5);
    assert_eq!(engine.time().secs, 15);
    assert_eq!(engine.phase(), SimPhase::Running);
}

#[test]
fn test_seconds_per_display() {
    let mut engine = load(northerly().with_settings(&[("secondsperdisplay", "3")]));
    engine.queue_command(SimCommand::Start);
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.time.secs, 3);
    assert_eq!(snapshot.scenario.seconds_per_display, 3);
}

#[test]
fn test_reset_restores_initial_state() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, SimConfig::default())
        .unwrap();
    let initial = serde_json::to_string(&engine.snapshot()).unwrap();

    engine.queue_command(SimCommand::Start);
    let first_run: Vec<String> = run_ticks(&mut engine, 50)
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect();

    engine.queue_command(SimCommand::Reset);
    let after_reset = engine.tick().unwrap();
    assert_eq!(after_reset.phase, SimPhase::Ready);
    assert_eq!(serde_json::to_string(&after_reset).unwrap(), initial);

    engine.queue_command(SimCommand::Start);
    let replay: Vec<String> = run_ticks(&mut engine, 50)
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect();
    assert_eq!(first_run, replay, "a reset run should replay exactly");
}

#[test]
fn test_finish_clears_world() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::WindwardLeeward, SimConfig::default())
        .unwrap();
    assert!(engine.world().len() > 0);
    engine.finish();
    assert_eq!(engine.world().len(), 0);
    let snapshot = engine.snapshot();
    assert!(snapshot.boats.is_empty());
    assert!(snapshot.marks.is_empty());
}

// ---- Scheduled overrides and keys ----

#[test]
fn test_scheduled_override_applied_at_its_second() {
    let mut engine = load(northerly().with_scheduled(5, "wind", &[("from", "30")]));
    engine.queue_command(SimCommand::Start);

    let before = run_ticks(&mut engine, 5);
    assert!(before.iter().all(|s| s.events.is_empty()));
    assert_eq!(engine.wind().mean_flow().from.degrees(), 0);

    let snapshot = engine.tick().unwrap();
    assert_eq!(
        snapshot.events,
        vec![SimEvent::OverrideApplied {
            instance: "wind".to_string(),
            secs: 5,
        }]
    );
    assert_eq!(engine.wind().mean_flow().from.degrees(), 30);
}

#[test]
fn test_several_overrides_in_one_second() {
    let mut engine = load(
        northerly()
            .with_element("red", "laser2", &[])
            .with_scheduled(0, "wind", &[("speed", "15")])
            .with_scheduled(0, "red", &[("heading", "90")]),
    );
    engine.queue_command(SimCommand::Start);
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.events.len(), 2);
    assert_eq!(engine.wind().mean_flow().knots, 15.0);
    assert_eq!(boat(&snapshot, "red").heading, 90);
}

#[test]
fn test_key_binding() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, SimConfig::default())
        .unwrap();
    engine.queue_command(SimCommand::Key {
        key: "v".to_string(),
    });
    let snapshot = engine.tick().unwrap();
    assert_eq!(
        snapshot.events,
        vec![SimEvent::KeyApplied {
            key: "v".to_string(),
            instance: "wind".to_string(),
        }]
    );
    assert_eq!(engine.wind().mean_flow().from.degrees(), 20);
}

#[test]
fn test_unbound_key_ignored() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, SimConfig::default())
        .unwrap();
    engine.queue_command(SimCommand::Key {
        key: "q".to_string(),
    });
    let snapshot = engine.tick().unwrap();
    assert!(snapshot.events.is_empty());
}

// ---- Boats ----

#[test]
fn test_boat_accelerates_with_inertia() {
    let mut engine = load(northerly().with_element("red", "laser2", &[("heading", "90")]));
    engine.queue_command(SimCommand::Start);
    let snapshots = run_ticks(&mut engine, 20);
    let speeds: Vec<f64> = snapshots.iter().map(|s| boat(s, "red").speed).collect();
    assert!(speeds[0] > 0.0);
    for pair in speeds.windows(2) {
        assert!(pair[1] >= pair[0], "speed should build steadily: {:?}", speeds);
    }
    let red = boat(&snapshots[19], "red");
    assert!(red.position.x > 0.0, "boat should sail east");
    assert_eq!(red.track.len(), 20, "one track point per second");
}

#[test]
fn test_water_carries_boat() {
    let mut engine = load(
        ScenarioDefinition::new("calm")
            .with_element("wind", "constantflow", &[("from", "0"), ("speed", "0")])
            .with_element("water", "constantflow", &[("from", "90"), ("speed", "1")])
            .with_element("red", "laser2", &[("heading", "90")]),
    );
    engine.queue_command(SimCommand::Start);
    let snapshots = run_ticks(&mut engine, 10);
    // No wind, no drive: only the stream moves the boat west.
    let red = boat(&snapshots[9], "red");
    assert!(red.position.x < -4.0, "boat should drift west: {:?}", red.position);
}

#[test]
fn test_pinched_boat_bears_away() {
    let mut engine = load(northerly().with_element("red", "laser2", &[("heading", "20")]));
    engine.queue_command(SimCommand::Start);
    let snapshot = engine.tick().unwrap();
    assert_eq!(boat(&snapshot, "red").mode, SailingMode::Turn);
    let snapshots = run_ticks(&mut engine, 10);
    let red = boat(&snapshots[9], "red");
    assert_eq!(red.mode, SailingMode::SailOn);
    assert_eq!(red.heading, 45);
}

#[test]
fn test_west_limit_reflects_heading() {
    let mut engine = load(
        northerly()
            .with_settings(&[("westlimit", "-50")])
            .with_element("red", "laser2", &[("location", "-40,0"), ("heading", "-90")]),
    );
    engine.queue_command(SimCommand::Start);
    let snapshots = run_ticks(&mut engine, 60);
    assert!(
        snapshots.iter().any(|s| boat(s, "red").mode == SailingMode::Turn),
        "boat should turn away from the limit"
    );
    let red = boat(&snapshots[59], "red");
    assert_eq!(red.heading, 90);
    assert!(red.position.x > -50.0);
    assert_eq!(snapshots[59].scenario.limits.map(|l| l.west), Some(-50.0));
}

#[test]
fn test_mark_rounding_starts_next_leg() {
    let mut engine = load(
        northerly()
            .with_settings(&[("firstmark", "a")])
            .with_element("a", "mark", &[("location", "0,0"), ("nextmark", "b")])
            .with_element("b", "mark", &[("location", "0,-200")])
            .with_element("red", "laser2", &[("location", "6,-2"), ("heading", "-45")]),
    );
    engine.queue_command(SimCommand::Start);

    let mut saw_rounding = false;
    let mut rounded = None;
    for _ in 0..60 {
        let snapshot = engine.tick().unwrap();
        if boat(&snapshot, "red").mode == SailingMode::MarkRounding {
            saw_rounding = true;
        }
        if let Some(event) = snapshot
            .events
            .iter()
            .find(|e| matches!(e, SimEvent::MarkRounded { .. }))
        {
            rounded = Some((event.clone(), snapshot.clone()));
            break;
        }
    }
    assert!(saw_rounding, "boat should enter mark rounding");
    let (event, snapshot) = rounded.expect("boat should round the mark");
    match event {
        SimEvent::MarkRounded { boat, mark, .. } => {
            assert_eq!(boat, "red");
            assert_eq!(mark, "a");
        }
        other => panic!("unexpected event {:?}", other),
    }
    let red = boat(&snapshot, "red");
    assert_eq!(red.mode, SailingMode::SailOn);
    assert_eq!(red.next_mark.as_deref(), Some("b"));
    assert!(red.following_mark.is_none());
    assert_eq!(red.heading, 180, "boat should bear away onto the next leg");
}

#[test]
fn test_beat_to_windward_mark() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::SingleBeat, SimConfig::default())
        .unwrap();
    engine.queue_command(SimCommand::Start);

    let mut closest = f64::MAX;
    let mut tacks = 0;
    let mut last_tack = None;
    for _ in 0..900 {
        let snapshot = engine.tick().unwrap();
        let red = boat(&snapshot, "red");
        closest = closest.min(red.distance_to_mark.unwrap_or(f64::MAX));
        if last_tack.is_some_and(|t| t != red.tack) {
            tacks += 1;
        }
        last_tack = Some(red.tack);
    }
    assert!(tacks >= 1, "a beat needs at least one tack");
    assert!(closest < 20.0, "boat should fetch the mark, closest {closest:.1} m");
}

#[test]
fn test_sail_angle_by_tack() {
    let wind = Direction::from_degrees(0.0);
    let mut boat = Boat::new(BoatClass::Laser2, Location::default());
    boat.heading = Direction::from_degrees(45.0);
    assert_eq!(boat.tack(wind), Side::Port);
    assert_eq!(boat.sail_angle(wind), 0);

    boat.heading = Direction::from_degrees(-135.0);
    assert_eq!(boat.tack(wind), Side::Starboard);
    assert_eq!(boat.sail_angle(wind), -60);
}

// ---- Marks ----

#[test]
fn test_layline_base_follows_wind() {
    let mut mark = Mark::default();
    mark.update_layline_base(Direction::from_degrees(0.0));
    // Port rounding: base sits east of the mark for windward laylines.
    let base = mark.layline_base();
    assert!((base.x - 2.0).abs() < 1e-9, "{:?}", base);
    assert!(base.y.abs() < 1e-9);

    mark.downwind_laylines = true;
    mark.update_layline_base(Direction::from_degrees(0.0));
    assert!((mark.layline_base().x + 2.0).abs() < 1e-9);
}

#[test]
fn test_laylines() {
    let mut mark = Mark::default();
    mark.windward_laylines = true;
    mark.layline_length = 100.0;
    let wind = Direction::from_degrees(0.0);
    mark.update_layline_base(wind);
    let lines = mark.laylines(wind);
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!((line.from.distance_to(&line.to) - 100.0).abs() < 1e-9);
        assert!(line.to.y < line.from.y, "windward laylines run downwind");
    }

    mark.downwind_laylines = true;
    assert_eq!(mark.laylines(wind).len(), 4);
}

#[test]
fn test_mark_snapshot_order_and_laylines() {
    let engine = SimulationEngine::from_scenario(ScenarioId::WindwardLeeward, SimConfig::default())
        .unwrap();
    let snapshot = engine.snapshot();
    let names: Vec<&str> = snapshot.marks.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["windward1", "leeward", "windward2", "finish"]);
    assert_eq!(snapshot.marks[1].laylines.len(), 2);
    let boats: Vec<&str> = snapshot.boats.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(boats, vec!["blue", "green"]);
}

#[test]
fn test_course_polar_passes_on_rounding_side() {
    let mark = Mark::default();
    let wind = Direction::from_degrees(0.0);
    // Approaching head to wind from the south: leaving the mark to port
    // means passing east of it.
    let polar = mark.course_polar(
        Location::new(0.0, -100.0),
        Direction::from_degrees(0.0),
        false,
        0.0,
        0.0,
        wind,
    );
    let target = polar.to_location(Location::new(0.0, -100.0));
    assert!((target.x - 2.0).abs() < 1e-6, "{:?}", target);
    assert!(target.y.abs() < 1e-6);
}

// ---- Snapshot ----

#[test]
fn test_snapshot_serializes() {
    let mut engine = SimulationEngine::from_scenario(ScenarioId::ShiftyFleet, SimConfig::default())
        .unwrap();
    engine.queue_command(SimCommand::Start);
    let snapshot = engine.tick().unwrap();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SimSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.boats.len(), 3);
    assert_eq!(back.clock, "00:01");
    assert!(!back.wind.arrows.is_empty(), "shown wind should carry arrows");
}

#[test]
fn test_builtin_definitions_titled() {
    assert_eq!(scenario::build_definition(ScenarioId::SingleBeat).title, "Single Beat");
    assert_eq!(
        scenario::build_definition(ScenarioId::WindwardLeeward).scheduled.len(),
        1
    );
    assert_eq!(scenario::build_definition(ScenarioId::ShiftyFleet).key_bindings.len(), 4);
}
