//! Boat-class profiles: handling metrics and speed tables.

use serde::{Deserialize, Serialize};

use racetrainer_core::constants::*;
use racetrainer_core::enums::BoatClass;

use crate::performance::PerformanceTable;

/// Physical and handling metrics for a boat class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoatMetrics {
    /// Hull length (m).
    pub length: f64,
    /// Beam (m).
    pub width: f64,
    /// Fraction of the gap to target speed closed each second (0-1).
    pub inertia: f64,
    /// Maximum turn rate (degrees per second).
    pub max_turn_rate: i32,
    /// Target angle off the wind when beating (degrees).
    pub upwind_angle: i32,
    /// Target angle off the wind when running (degrees).
    pub downwind_angle: i32,
}

impl BoatMetrics {
    /// Distance from a mark inside which rounding rules apply (m).
    pub fn close_distance(&self) -> f64 {
        self.length * CLOSE_DISTANCE_LENGTHS
    }

    /// Offset from a mark when sailing to it (m).
    pub fn clearance(&self) -> f64 {
        self.width * CLEARANCE_WIDTHS
    }

    /// Turn rate at `speed` m/s: half rate when slow.
    pub fn turn_rate(&self, speed: f64) -> i32 {
        if speed < SLOW_TURN_SPEED {
            self.max_turn_rate / 2
        } else {
            self.max_turn_rate
        }
    }

    /// Bearing to a mark (degrees) at which rounding starts, for a turn rate.
    pub fn close_angle(turn_rate: i32) -> i32 {
        90 - turn_rate / 2
    }
}

/// Everything needed to sail a boat of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct BoatProfile {
    pub class: BoatClass,
    pub metrics: BoatMetrics,
    pub table: PerformanceTable,
}

/// Get the profile for a boat class.
pub fn get_profile(class: BoatClass) -> BoatProfile {
    match class {
        BoatClass::Laser2 => BoatProfile {
            class,
            metrics: BoatMetrics {
                length: 4.0,
                width: 1.5,
                inertia: 0.25,
                max_turn_rate: 30,
                upwind_angle: 45,
                downwind_angle: 135,
            },
            table: laser2_table(),
        },
    }
}

/// Registered class name for a boat class.
pub fn class_name(class: BoatClass) -> &'static str {
    match class {
        BoatClass::Laser2 => "laser2",
    }
}

pub fn class_for_name(name: &str) -> Option<BoatClass> {
    [BoatClass::Laser2]
        .into_iter()
        .find(|c| class_name(*c) == name)
}

fn laser2_table() -> PerformanceTable {
    PerformanceTable {
        wind_angles: vec![0, 40, 45, 60, 75, 90, 110, 120, 150, 180, 190],
        wind_speeds: vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 100.0],
        boat_speeds: vec![
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![-0.3, 0.0, 1.1, 1.1, 1.5, 2.0, 2.0, 2.0, 1.2, 0.8, 0.8],
            vec![-0.8, 0.0, 2.5, 2.9, 2.9, 3.8, 3.5, 3.0, 2.3, 1.8, 1.8],
            vec![-1.0, 0.0, 3.1, 3.1, 4.1, 5.6, 5.0, 4.2, 3.2, 2.5, 2.5],
            vec![-1.1, 0.0, 3.5, 3.5, 4.6, 6.9, 6.5, 5.8, 4.2, 3.6, 3.6],
            vec![-1.2, 0.0, 3.9, 3.9, 5.1, 10.9, 10.0, 8.0, 5.0, 4.5, 4.5],
            vec![-1.5, 0.0, 4.3, 4.3, 5.7, 12.4, 13.0, 10.0, 6.0, 5.0, 5.0],
            vec![-1.5, 0.0, 5.1, 5.1, 6.5, 13.5, 14.5, 12.0, 7.5, 5.5, 5.5],
            vec![-1.5, 0.0, 5.2, 5.2, 7.0, 14.0, 17.0, 14.0, 9.0, 7.1, 7.1],
            vec![-1.5, 0.0, 5.3, 5.3, 7.1, 14.5, 18.0, 15.8, 10.2, 7.8, 7.8],
            vec![-1.5, 0.0, 5.3, 5.3, 7.1, 15.0, 19.0, 17.5, 12.0, 9.0, 9.0],
            vec![-1.5, 0.0, 5.3, 5.3, 7.1, 15.0, 19.0, 17.5, 12.0, 9.0, 9.0],
        ],
    }
}
