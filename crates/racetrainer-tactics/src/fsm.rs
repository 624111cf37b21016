//! Boat sailing decision state machine.
//!
//! Pure functions that pick the next manoeuvre for a boat in `SailOn` from
//! its situation relative to the wind, the hard limits and the course.
//! No ECS dependency: the engine gathers a [`SailingContext`] per boat and
//! applies the returned [`SailingUpdate`].

use serde::{Deserialize, Serialize};

use racetrainer_core::constants::*;
use racetrainer_core::enums::Side;
use racetrainer_core::types::{Bounds, Direction, Location, Polar};

/// A corridor either side of the rhumb line, in metres. The left half
/// applies on starboard tack, the right half on port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub left: f64,
    pub right: f64,
}

impl Channel {
    /// Half-width that applies on `tack`.
    pub fn for_tack(&self, tack: Side) -> f64 {
        match tack {
            Side::Starboard => self.left,
            Side::Port => self.right,
        }
    }
}

/// Which tactical rules a boat follows in open water.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TacticalPolicy {
    pub upwind_best_tack: bool,
    pub upwind_tack_if_headed: bool,
    pub upwind_bear_away_if_headed: bool,
    pub upwind_luff_if_lifted: bool,
    pub reach_downwind: bool,
    pub downwind_best_gybe: bool,
    pub downwind_bear_away_if_headed: bool,
    pub downwind_gybe_if_lifted: bool,
    pub downwind_luff_if_lifted: bool,
    pub upwind_channel: Option<Channel>,
    pub downwind_channel: Option<Channel>,
}

/// Where the boat stands relative to its next mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseSituation {
    pub pass_side: Side,
    pub distance_to_mark: f64,
    /// Bearing of the mark off the heading, positive toward the pass side.
    pub angle_to_mark: i32,
    /// Angle between the wind and the course to the clearance point.
    pub mark_angle_to_wind: i32,
    /// Course to the clearance point beside the mark.
    pub sail_to_mark: Direction,
    /// Boat position relative to the start of the leg.
    pub from_start_of_leg: Polar,
    /// The leg itself: start of leg to mark.
    pub leg: Polar,
    /// Bearing from the next mark to the one after it.
    pub following_bearing: Option<Direction>,
}

impl CourseSituation {
    /// Measure the course situation for a boat at `position` on `heading`.
    #[allow(clippy::too_many_arguments)]
    pub fn measure(
        position: Location,
        heading: Direction,
        wind: Direction,
        mark: Location,
        pass_side: Side,
        clearance: f64,
        start_of_leg: Location,
        following_bearing: Option<Direction>,
    ) -> Self {
        let to_mark = Polar::between(position, mark);
        // Aim off so the mark stays on the pass side.
        let sail_to = to_mark + Polar::from_degrees(
            clearance,
            to_mark.direction().degrees_f64() - f64::from(pass_side.sign()) * 90.0,
        );
        Self {
            pass_side,
            distance_to_mark: to_mark.distance(),
            angle_to_mark: heading.angle_diff(&to_mark.direction()) * pass_side.sign(),
            mark_angle_to_wind: wind.abs_angle_diff(&sail_to.direction()),
            sail_to_mark: sail_to.direction(),
            from_start_of_leg: Polar::between(start_of_leg, position),
            leg: Polar::between(start_of_leg, mark),
            following_bearing,
        }
    }

    /// Cross-track offset from the leg, positive on the side given by `sign`.
    fn channel_offset(&self, sign: i32) -> f64 {
        let angle = self.from_start_of_leg.angle_diff(&self.leg.direction());
        self.from_start_of_leg.distance() * f64::from(sign * angle).to_radians().sin()
    }
}

/// Input to the decision state machine for one boat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SailingContext {
    pub position: Location,
    pub heading: Direction,
    /// Boat speed (m/s).
    pub speed: f64,
    /// Wind direction at the boat.
    pub wind: Direction,
    pub tack: Side,
    pub boat_angle_to_wind: i32,
    /// Signed angle from the local wind to the mean wind.
    pub wind_angle_to_mean: i32,
    pub upwind_angle: i32,
    pub downwind_angle: i32,
    pub close_distance: f64,
    pub close_angle: i32,
    pub limits: Option<Bounds>,
    pub policy: TacticalPolicy,
    pub course: Option<CourseSituation>,
    /// Sticky flag letting the reach logic keep steering inside the close
    /// distance.
    pub allow_correction: bool,
}

impl SailingContext {
    /// Tack implied by sailing on `heading` in `wind`.
    pub fn tack_for(heading: Direction, wind: Direction) -> Side {
        if heading.angle_diff(&wind) > 0 {
            Side::Starboard
        } else {
            Side::Port
        }
    }
}

/// The manoeuvre chosen for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    SailOn,
    Stop,
    Turn { target: Direction, side: Side },
    RoundMark { target: Direction, side: Side },
}

/// Output from the decision state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SailingUpdate {
    pub decision: Decision,
    pub allow_correction: bool,
}

/// Evaluate one boat in `SailOn`.
pub fn evaluate(ctx: &SailingContext) -> SailingUpdate {
    let keep = |decision| SailingUpdate {
        decision,
        allow_correction: ctx.allow_correction,
    };
    if let Some(decision) = limits(ctx) {
        return keep(decision);
    }
    match &ctx.course {
        None => keep(simple(ctx)),
        Some(course) => full(ctx, course),
    }
}

/// Reflect the heading off any hard limit the boat would cross within four
/// seconds at its current speed.
pub fn limits(ctx: &SailingContext) -> Option<Decision> {
    let bounds = ctx.limits?;
    let distance = ctx.speed * LIMIT_LOOKAHEAD_SECS;
    let angle = ctx.heading.degrees();
    let pos = ctx.position;
    let turn = |degrees: i32, starboard: bool| Decision::Turn {
        target: Direction::from_degrees(f64::from(degrees)),
        side: if starboard { Side::Starboard } else { Side::Port },
    };
    let reflect_ns = (if angle > 0 { 180 } else { -180 }) - angle;

    if pos.x <= bounds.west + distance && angle < 0 {
        return Some(turn(-angle, angle > -90));
    }
    if pos.x >= bounds.east - distance && angle > 0 {
        return Some(turn(-angle, angle > 90));
    }
    if pos.y >= bounds.north - distance && angle.abs() < 90 {
        return Some(turn(reflect_ns, angle > 0));
    }
    if pos.y <= bounds.south + distance && angle.abs() > 90 {
        return Some(turn(reflect_ns, angle < 0));
    }
    None
}

/// No course: only bear away when pinched above the upwind angle.
pub fn simple(ctx: &SailingContext) -> Decision {
    pinch_correction(ctx)
}

fn full(ctx: &SailingContext, course: &CourseSituation) -> SailingUpdate {
    let keep = |decision| SailingUpdate {
        decision,
        allow_correction: ctx.allow_correction,
    };
    if course.distance_to_mark <= ctx.close_distance {
        return keep(near_mark(ctx, course));
    }
    if course.mark_angle_to_wind < ctx.upwind_angle {
        return keep(upwind(ctx, course));
    }
    if course.mark_angle_to_wind > ctx.downwind_angle && ctx.policy.reach_downwind {
        return keep(downwind(ctx, course));
    }
    reach(ctx, course)
}

fn near_mark(ctx: &SailingContext, course: &CourseSituation) -> Decision {
    let t = ctx.tack.sign();
    let up = ctx.upwind_angle;

    if course.angle_to_mark < 0 {
        // Overstood on the wrong side: tack round.
        return Decision::Turn {
            target: wind_plus(ctx, t * up),
            side: ctx.tack,
        };
    }
    let Some(following) = course.following_bearing else {
        return if course.angle_to_mark > 90 {
            Decision::Stop
        } else {
            Decision::SailOn
        };
    };
    let side = course.pass_side;

    if ctx.boat_angle_to_wind < 90 && side == ctx.tack {
        if course.angle_to_mark >= ctx.close_angle + MARK_WIDEN_MARGIN {
            return Decision::Turn {
                target: wind_plus(ctx, side.sign() * up),
                side,
            };
        }
        return pinch_correction(ctx);
    }
    if course.angle_to_mark >= ctx.close_angle {
        let target = if ctx.wind.abs_angle_diff(&following) < up {
            wind_plus(ctx, -side.sign() * up)
        } else {
            following
        };
        return Decision::RoundMark { target, side };
    }
    pinch_correction(ctx)
}

fn pinch_correction(ctx: &SailingContext) -> Decision {
    if ctx.boat_angle_to_wind < ctx.upwind_angle {
        return Decision::Turn {
            target: wind_plus(ctx, -ctx.tack.sign() * ctx.upwind_angle),
            side: ctx.tack.opposite(),
        };
    }
    Decision::SailOn
}

fn upwind(ctx: &SailingContext, course: &CourseSituation) -> Decision {
    let t = ctx.tack.sign();
    let up = ctx.upwind_angle;
    let policy = &ctx.policy;
    let tack = Decision::Turn {
        target: wind_plus(ctx, t * up),
        side: ctx.tack,
    };

    if let Some(channel) = policy.upwind_channel {
        let width = channel.for_tack(ctx.tack);
        if course.distance_to_mark > -width * CHANNEL_ENTRY_FACTOR
            && course.channel_offset(t) > width
        {
            return tack;
        }
    }
    if policy.upwind_best_tack && t * ctx.wind_angle_to_mean > 0 {
        return tack;
    }
    if policy.upwind_tack_if_headed && ctx.boat_angle_to_wind < up {
        return tack;
    }
    if policy.upwind_bear_away_if_headed && ctx.boat_angle_to_wind < up {
        return Decision::Turn {
            target: wind_plus(ctx, -t * up),
            side: ctx.tack.opposite(),
        };
    }
    if policy.upwind_luff_if_lifted && ctx.boat_angle_to_wind > up {
        return Decision::Turn {
            target: wind_plus(ctx, -t * up),
            side: ctx.tack,
        };
    }
    Decision::SailOn
}

fn downwind(ctx: &SailingContext, course: &CourseSituation) -> Decision {
    let t = ctx.tack.sign();
    let down = ctx.downwind_angle;
    let policy = &ctx.policy;
    let gybe = Decision::Turn {
        target: wind_plus(ctx, t * down),
        side: ctx.tack.opposite(),
    };

    if let Some(channel) = policy.downwind_channel {
        let width = channel.for_tack(ctx.tack);
        if course.distance_to_mark > -width * CHANNEL_ENTRY_FACTOR
            && course.channel_offset(-t) > width
        {
            return gybe;
        }
    }
    if policy.downwind_best_gybe && t * ctx.wind_angle_to_mean < 0 {
        return gybe;
    }
    if policy.downwind_gybe_if_lifted && ctx.boat_angle_to_wind > down {
        return gybe;
    }
    if policy.downwind_luff_if_lifted && ctx.boat_angle_to_wind > down {
        return Decision::Turn {
            target: wind_plus(ctx, -t * down),
            side: ctx.tack,
        };
    }
    if policy.downwind_bear_away_if_headed && ctx.boat_angle_to_wind < down {
        return Decision::Turn {
            target: wind_plus(ctx, -t * down),
            side: ctx.tack.opposite(),
        };
    }
    Decision::SailOn
}

fn reach(ctx: &SailingContext, course: &CourseSituation) -> SailingUpdate {
    if !(ctx.allow_correction || course.distance_to_mark > ctx.close_distance) {
        return SailingUpdate {
            decision: Decision::SailOn,
            allow_correction: ctx.allow_correction,
        };
    }
    let t = ctx.tack.sign();
    let target = course.sail_to_mark;

    if t * ctx.wind.angle_diff(&target) >= 0 {
        // Mark lies across the wind from this tack.
        let decision = if ctx.boat_angle_to_wind < 90 {
            Decision::Turn {
                target: wind_plus(ctx, t * ctx.upwind_angle),
                side: ctx.tack,
            }
        } else {
            Decision::Turn {
                target,
                side: ctx.tack.opposite(),
            }
        };
        return SailingUpdate {
            decision,
            allow_correction: true,
        };
    }

    let off = t * ctx.heading.angle_diff(&target);
    let decision = match off.signum() {
        -1 => Decision::Turn {
            target,
            side: ctx.tack.opposite(),
        },
        1 => Decision::Turn {
            target,
            side: ctx.tack,
        },
        _ => Decision::SailOn,
    };
    SailingUpdate {
        decision,
        allow_correction: false,
    }
}

/// One second of a turn toward `target` at `rate` degrees per second.
/// Returns the heading to steer and whether the turn completes.
pub fn turn_step(heading: Direction, target: Direction, side: Side, rate: i32) -> (Direction, bool) {
    if heading.abs_angle_diff(&target) <= rate {
        (target, true)
    } else {
        (heading.offset(f64::from(side.sign() * rate)), false)
    }
}

fn wind_plus(ctx: &SailingContext, degrees: i32) -> Direction {
    ctx.wind.offset(f64::from(degrees))
}
