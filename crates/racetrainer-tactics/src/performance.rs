//! Boat speed performance tables.
//!
//! A table gives target boat speed (knots) for a grid of true wind angles
//! and wind speeds. Lookups bracket each axis with a linear scan (the last
//! entry not above the query) and interpolate bilinearly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a performance table was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("{axis} axis needs at least two entries")]
    TooShort { axis: &'static str },
    #[error("{axis} axis must be strictly ascending")]
    NotAscending { axis: &'static str },
    #[error("expected {expected} speed rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("speed row {row} has {actual} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Boat speed by wind angle (columns) and wind speed (rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTable {
    pub(crate) wind_angles: Vec<i32>,
    pub(crate) wind_speeds: Vec<f64>,
    pub(crate) boat_speeds: Vec<Vec<f64>>,
}

impl PerformanceTable {
    /// Check axis lengths, ordering and row shapes.
    pub fn validate(&self) -> Result<(), TableError> {
        let (wind_angles, wind_speeds, boat_speeds) =
            (&self.wind_angles, &self.wind_speeds, &self.boat_speeds);
        if wind_angles.len() < 2 {
            return Err(TableError::TooShort { axis: "wind angle" });
        }
        if wind_speeds.len() < 2 {
            return Err(TableError::TooShort { axis: "wind speed" });
        }
        if wind_angles.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TableError::NotAscending { axis: "wind angle" });
        }
        if wind_speeds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TableError::NotAscending { axis: "wind speed" });
        }
        if boat_speeds.len() != wind_speeds.len() {
            return Err(TableError::RowCount {
                expected: wind_speeds.len(),
                actual: boat_speeds.len(),
            });
        }
        if let Some((row, speeds)) = boat_speeds
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != wind_angles.len())
        {
            return Err(TableError::RowLength {
                row,
                expected: wind_angles.len(),
                actual: speeds.len(),
            });
        }
        Ok(())
    }

    /// Target boat speed in knots at `wind_angle` degrees off the wind and
    /// `wind_knots` of true wind.
    pub fn potential_speed(&self, wind_angle: i32, wind_knots: f64) -> f64 {
        let angle = f64::from(wind_angle);
        let angles: Vec<f64> = self.wind_angles.iter().map(|a| f64::from(*a)).collect();
        let ai = bracket(&angles, angle);
        let si = bracket(&self.wind_speeds, wind_knots);

        let angle_ratio = (angle - angles[ai]) / (angles[ai + 1] - angles[ai]);
        let lower = lerp(
            self.boat_speeds[si][ai],
            self.boat_speeds[si][ai + 1],
            angle_ratio,
        );
        let upper = lerp(
            self.boat_speeds[si + 1][ai],
            self.boat_speeds[si + 1][ai + 1],
            angle_ratio,
        );
        let speed_ratio =
            (wind_knots - self.wind_speeds[si]) / (self.wind_speeds[si + 1] - self.wind_speeds[si]);
        lerp(lower, upper, speed_ratio)
    }
}

/// Index of the last entry not above `value`, kept inside `0..len-1` so
/// that `index + 1` is always a valid upper bracket.
fn bracket(axis: &[f64], value: f64) -> usize {
    let mut index: isize = -1;
    for entry in axis {
        if *entry > value {
            break;
        }
        index += 1;
    }
    index.clamp(0, axis.len() as isize - 2) as usize
}

fn lerp(from: f64, to: f64, ratio: f64) -> f64 {
    from + ratio * (to - from)
}
