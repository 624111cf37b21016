//! Simulation constants and tuning parameters.

/// Knots to metres per second (one nautical mile = 1853 m).
pub const KNOTS_TO_METRES_PER_SECOND: f64 = 1853.0 / 3600.0;

/// Simulated seconds per engine advance.
pub const SECONDS_PER_ADVANCE: u32 = 1;

// --- Scenario ---

/// Default half-width of the visible area (m).
pub const DEFAULT_HALF_EXTENT: f64 = 500.0;

/// Default display scale (pixels per metre).
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Default wind speed when no wind element is defined (knots).
pub const DEFAULT_WIND_KNOTS: f64 = 10.0;

/// Reserved instance names for the two flow fields.
pub const WIND_INSTANCE: &str = "wind";
pub const WATER_INSTANCE: &str = "water";

/// Reserved instance name for scenario-wide settings.
pub const SCENARIO_INSTANCE: &str = "scenario";

// --- Flow perturbation ---

/// Default swing amplitude (degrees).
pub const DEFAULT_SWING_ANGLE: i32 = 10;

/// Default swing period (s).
pub const DEFAULT_SWING_PERIOD: i32 = 120;

/// Default shift magnitude (degrees).
pub const DEFAULT_SHIFT_ANGLE: i32 = 10;

/// Default shift period (s).
pub const DEFAULT_SHIFT_PERIOD: i32 = 120;

/// Per-tick probability that a random shift takes effect.
pub const RANDOM_SHIFT_PROBABILITY: f64 = 0.02;

/// Default spacing of displayed flow arrows (m).
pub const DEFAULT_FLOW_ARROW_INTERVAL: f64 = 100.0;

// --- Marks ---

/// Mark radius (m).
pub const MARK_SIZE: f64 = 1.0;

/// Default layline length (m).
pub const DEFAULT_LAYLINE_LENGTH: f64 = 0.0;

// --- Boats ---

/// "Close to mark" distance as a multiple of boat length.
pub const CLOSE_DISTANCE_LENGTHS: f64 = 3.0;

/// Mark clearance as a multiple of boat width.
pub const CLEARANCE_WIDTHS: f64 = 2.0;

/// Seconds of travel looked ahead when checking hard limits.
pub const LIMIT_LOOKAHEAD_SECS: f64 = 4.0;

/// Below this speed (m/s) the boat turns at half rate.
pub const SLOW_TURN_SPEED: f64 = 1.0;

/// Extra bearing (degrees) past the close angle before widening at a mark.
pub const MARK_WIDEN_MARGIN: i32 = 30;

/// Factor applied to the channel half-width when deciding to hold a channel.
pub const CHANNEL_ENTRY_FACTOR: f64 = 1.5;
