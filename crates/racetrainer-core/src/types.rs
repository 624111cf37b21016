//! Fundamental geometric and simulation types.
//!
//! Angles follow compass conventions: 0 = North, positive clockwise,
//! `x = r·sinθ`, `y = r·cosθ`.

use std::f64::consts::{PI, TAU};
use std::ops::{Add, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::KNOTS_TO_METRES_PER_SECOND;

/// Position on the water in metres from the scenario origin.
/// x = East, y = North.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// Compass direction in radians, always normalized to (-π, π].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Direction {
    radians: f64,
}

/// A relative position expressed as a distance and a direction.
///
/// `r` is never negative: constructing with a negative distance flips the
/// direction by 180°.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    r: f64,
    theta: Direction,
}

/// Wind or water flow: the direction it comes *from* and its speed in knots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub from: Direction,
    pub knots: f64,
}

/// A rectangle on the water, edges in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub east: f64,
    pub west: f64,
    pub north: f64,
    pub south: f64,
}

/// Simulation time tracking. One tick is one simulated second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    /// Elapsed simulated seconds.
    pub secs: u32,
}

fn normalize_radians(radians: f64) -> f64 {
    let r = radians.rem_euclid(TAU);
    if r > PI {
        r - TAU
    } else {
        r
    }
}

fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Location) -> f64 {
        (other.as_vec2() - self.as_vec2()).length()
    }

    /// Compass bearing from this location to another.
    pub fn bearing_to(&self, other: &Location) -> Direction {
        Direction::between(*self, *other)
    }

    pub fn as_vec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn from_vec2(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Direction {
    pub fn from_radians(radians: f64) -> Self {
        Self {
            radians: normalize_radians(radians),
        }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        // Normalize in degrees first so whole-degree inputs stay exact.
        let radians = normalize_degrees(degrees).to_radians().min(PI);
        Self { radians }
    }

    /// Compass bearing from `from` to `to` (`atan2(Δx, Δy)`).
    pub fn between(from: Location, to: Location) -> Self {
        let delta = to.as_vec2() - from.as_vec2();
        Self::from_radians(delta.x.atan2(delta.y))
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    /// Direction in whole degrees, rounded, within (-180, 180].
    pub fn degrees(&self) -> i32 {
        let d = self.radians.to_degrees().round() as i32;
        if d == -180 {
            180
        } else {
            d
        }
    }

    pub fn degrees_f64(&self) -> f64 {
        self.radians.to_degrees()
    }

    /// This direction turned by `degrees` (positive = clockwise).
    pub fn offset(&self, degrees: f64) -> Self {
        Self::from_degrees(self.degrees_f64() + degrees)
    }

    pub fn offset_radians(&self, radians: f64) -> Self {
        Self::from_radians(self.radians + radians)
    }

    pub fn opposite(&self) -> Self {
        self.offset_radians(PI)
    }

    /// Signed shortest rotation from this direction to `other`, in whole
    /// degrees within (-180, 180]. Positive means `other` lies clockwise.
    pub fn angle_diff(&self, other: &Direction) -> i32 {
        let d = normalize_radians(other.radians - self.radians)
            .to_degrees()
            .round() as i32;
        if d == -180 {
            180
        } else {
            d
        }
    }

    pub fn abs_angle_diff(&self, other: &Direction) -> i32 {
        self.angle_diff(other).abs()
    }

    /// Unit vector pointing along this direction.
    pub fn unit(&self) -> DVec2 {
        DVec2::new(self.radians.sin(), self.radians.cos())
    }
}

impl From<f64> for Direction {
    fn from(radians: f64) -> Self {
        Self::from_radians(radians)
    }
}

impl From<Direction> for f64 {
    fn from(direction: Direction) -> f64 {
        direction.radians
    }
}

impl Polar {
    pub fn new(r: f64, theta: Direction) -> Self {
        if r < 0.0 {
            Self {
                r: -r,
                theta: theta.opposite(),
            }
        } else {
            Self { r, theta }
        }
    }

    pub fn from_degrees(r: f64, degrees: f64) -> Self {
        Self::new(r, Direction::from_degrees(degrees))
    }

    /// Vector from `origin` to `target`.
    pub fn between(origin: Location, target: Location) -> Self {
        Self::from_vec2(target.as_vec2() - origin.as_vec2())
    }

    pub fn from_vec2(v: DVec2) -> Self {
        Self {
            r: v.length(),
            theta: Direction::from_radians(v.x.atan2(v.y)),
        }
    }

    pub fn as_vec2(&self) -> DVec2 {
        self.theta.unit() * self.r
    }

    /// The location reached by applying this vector at `origin`.
    pub fn to_location(&self, origin: Location) -> Location {
        Location::from_vec2(origin.as_vec2() + self.as_vec2())
    }

    pub fn distance(&self) -> f64 {
        self.r
    }

    pub fn direction(&self) -> Direction {
        self.theta
    }

    /// Add `distance` at right angles, to the right of the vector.
    pub fn add_perpendicular(&self, distance: f64) -> Self {
        let side = DVec2::new(self.theta.radians.cos(), -self.theta.radians.sin());
        Self::from_vec2(self.as_vec2() + side * distance)
    }

    /// Subtract `distance` at right angles (moves the end to the left).
    pub fn sub_perpendicular(&self, distance: f64) -> Self {
        self.add_perpendicular(-distance)
    }

    /// Signed difference from this vector's direction to `direction`.
    pub fn angle_diff(&self, direction: &Direction) -> i32 {
        self.theta.angle_diff(direction)
    }

    pub fn abs_angle_diff(&self, direction: &Direction) -> i32 {
        self.theta.abs_angle_diff(direction)
    }

    /// Length of this vector projected onto the axis of `direction`.
    pub fn distance_along(&self, direction: &Direction) -> f64 {
        let diff = f64::from(self.angle_diff(direction)).to_radians();
        self.r * diff.cos().abs()
    }
}

impl Add for Polar {
    type Output = Polar;

    fn add(self, rhs: Polar) -> Polar {
        Polar::from_vec2(self.as_vec2() + rhs.as_vec2())
    }
}

impl Sub for Polar {
    type Output = Polar;

    fn sub(self, rhs: Polar) -> Polar {
        Polar::from_vec2(self.as_vec2() - rhs.as_vec2())
    }
}

impl Flow {
    pub fn new(from: Direction, knots: f64) -> Self {
        Self { from, knots }
    }

    pub fn from_degrees(degrees: f64, knots: f64) -> Self {
        Self::new(Direction::from_degrees(degrees), knots)
    }

    /// Speed in metres per second.
    pub fn metres_per_second(&self) -> f64 {
        knots_to_metres_per_second(self.knots)
    }
}

/// Convert a speed in knots to metres per second.
pub fn knots_to_metres_per_second(knots: f64) -> f64 {
    knots * KNOTS_TO_METRES_PER_SECOND
}

impl Bounds {
    /// Unbounded area; used for unset hard limits.
    pub const UNLIMITED: Bounds = Bounds {
        east: f64::MAX,
        west: -f64::MAX,
        north: f64::MAX,
        south: -f64::MAX,
    };

    pub fn north_east(&self) -> Location {
        Location::new(self.east, self.north)
    }

    pub fn north_west(&self) -> Location {
        Location::new(self.west, self.north)
    }

    pub fn south_east(&self) -> Location {
        Location::new(self.east, self.south)
    }

    pub fn south_west(&self) -> Location {
        Location::new(self.west, self.south)
    }

    pub fn contains(&self, pos: &Location) -> bool {
        pos.x >= self.west && pos.x <= self.east && pos.y >= self.south && pos.y <= self.north
    }
}

impl Default for Bounds {
    fn default() -> Self {
        use crate::constants::DEFAULT_HALF_EXTENT;
        Self {
            east: DEFAULT_HALF_EXTENT,
            west: -DEFAULT_HALF_EXTENT,
            north: DEFAULT_HALF_EXTENT,
            south: -DEFAULT_HALF_EXTENT,
        }
    }
}

impl SimTime {
    pub fn advance(&mut self) {
        self.secs += 1;
    }

    /// Elapsed time as `mm:ss`.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.secs / 60, self.secs % 60)
    }
}
