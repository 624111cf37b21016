//! Time-based perturbations applied on top of the interpolated flow:
//! a sinusoidal swing and a stepped (optionally random) shift.

use rand::Rng;
use serde::{Deserialize, Serialize};

use racetrainer_core::constants::*;

/// Oscillation of the flow direction: `amplitude·sin(2π·(t mod period)/period)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    /// Amplitude (degrees).
    pub angle: i32,
    /// Period (s).
    pub period: i32,
    pub enabled: bool,
    /// Current offset (degrees).
    pub now: f64,
}

/// Stepped shift cycling 0, -angle, 0, +angle over the quarters of its period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Magnitude (degrees).
    pub angle: i32,
    /// Period (s).
    pub period: i32,
    /// Pick a random phase each tick and apply it only occasionally.
    pub random: bool,
    pub enabled: bool,
    /// Current offset (degrees).
    pub now: f64,
}

impl Default for Swing {
    fn default() -> Self {
        Self {
            angle: DEFAULT_SWING_ANGLE,
            period: DEFAULT_SWING_PERIOD,
            enabled: false,
            now: 0.0,
        }
    }
}

impl Default for Shift {
    fn default() -> Self {
        Self {
            angle: DEFAULT_SHIFT_ANGLE,
            period: DEFAULT_SHIFT_PERIOD,
            random: false,
            enabled: false,
            now: 0.0,
        }
    }
}

impl Swing {
    pub fn set_angle(&mut self, angle: i32) {
        self.angle = angle;
        self.enabled = self.period > 0;
    }

    pub fn set_period(&mut self, period: i32) {
        self.period = period;
        self.enabled = self.period > 0;
    }

    pub fn advance(&mut self, secs: u32) {
        if !self.enabled {
            self.now = 0.0;
            return;
        }
        let period = f64::from(self.period);
        let phase = (f64::from(secs) % period) / period;
        self.now = (phase * std::f64::consts::TAU).sin() * f64::from(self.angle);
    }
}

impl Shift {
    pub fn set_angle(&mut self, angle: i32) {
        self.angle = angle;
        self.refresh_enabled();
    }

    pub fn set_period(&mut self, period: i32) {
        self.period = period;
        self.refresh_enabled();
    }

    pub fn set_random(&mut self, random: bool) {
        self.random = random;
        self.refresh_enabled();
    }

    fn refresh_enabled(&mut self) {
        self.enabled = self.period > 0 || self.random;
    }

    /// Step value for a phase `delta` seconds into the period.
    pub fn step_value(&self, delta: f64) -> f64 {
        // Quarter length truncates to whole seconds.
        let quarter = f64::from(self.period / 4);
        let angle = f64::from(self.angle);
        if delta < quarter {
            0.0
        } else if delta < quarter * 2.0 {
            -angle
        } else if delta < quarter * 3.0 {
            0.0
        } else {
            angle
        }
    }

    pub fn advance<R: Rng>(&mut self, secs: u32, rng: &mut R) {
        if !self.enabled {
            self.now = 0.0;
            return;
        }
        if self.random {
            let delta = rng.gen::<f64>() * f64::from(self.period);
            let value = self.step_value(delta);
            if rng.gen::<f64>() <= RANDOM_SHIFT_PROBABILITY {
                self.now = value;
            }
        } else {
            let delta = f64::from(secs % self.period.max(1) as u32);
            self.now = self.step_value(delta);
        }
    }
}
