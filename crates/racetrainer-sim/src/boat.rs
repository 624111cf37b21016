//! Boats: state, leg bookkeeping, one-second advance and motion.
//!
//! Each second a boat in `SailOn` asks the tactics state machine what to
//! do; turns and roundings then run one rate-limited step per second until
//! the target heading is reached.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use racetrainer_core::enums::{BoatClass, SailingMode, Side};
use racetrainer_core::error::SimError;
use racetrainer_core::events::SimEvent;
use racetrainer_core::params::{Colour, ParamField, ParamSchema, Parameterised};
use racetrainer_core::state::BoatView;
use racetrainer_core::types::{knots_to_metres_per_second, Bounds, Direction, Location, Polar};
use racetrainer_flow::FlowField;
use racetrainer_tactics::fsm::{
    self, Channel, CourseSituation, Decision, SailingContext, TacticalPolicy,
};
use racetrainer_tactics::performance::PerformanceTable;
use racetrainer_tactics::profiles::{get_profile, BoatMetrics};

use crate::mark::{Course, CourseMark};

/// Positions a boat has sailed through, shared with readers that take a
/// copy.
#[derive(Debug, Clone, Default)]
pub struct Track(Arc<Mutex<Vec<Location>>>);

impl Track {
    pub fn push(&self, location: Location) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location);
    }

    pub fn snapshot(&self) -> Vec<Location> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// The current leg: the mark sailed to, the one after it and where the
/// leg began.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub next: Option<String>,
    pub following: Option<String>,
    pub start: Location,
}

/// Everything outside the boat that one second of sailing depends on.
pub struct BoatEnvironment<'a> {
    pub wind: &'a FlowField,
    pub water: &'a FlowField,
    pub limits: Bounds,
    pub course: &'a Course,
}

#[derive(Debug, Clone)]
pub struct Boat {
    pub class: BoatClass,
    pub metrics: BoatMetrics,
    table: PerformanceTable,
    pub position: Location,
    pub heading: Direction,
    /// Heading a turn or rounding is steering for.
    pub target_heading: Direction,
    pub turn_side: Side,
    /// Speed through the water (m/s).
    pub speed: f64,
    pub mode: SailingMode,
    /// Degrees per second available this second.
    pub turn_rate: i32,
    pub close_angle: i32,
    pub policy: TacticalPolicy,
    pub allow_correction: bool,
    pub colour: Colour,
    pub track_colour: Colour,
    pub leg: Leg,
    pub track: Track,
}

impl Boat {
    /// A stationary boat of `class` at `position`, heading north.
    pub fn new(class: BoatClass, position: Location) -> Self {
        let profile = get_profile(class);
        let turn_rate = profile.metrics.max_turn_rate / 2;
        Self {
            class,
            metrics: profile.metrics,
            table: profile.table,
            position,
            heading: Direction::default(),
            target_heading: Direction::default(),
            turn_side: Side::Starboard,
            speed: 0.0,
            mode: SailingMode::default(),
            turn_rate,
            close_angle: BoatMetrics::close_angle(turn_rate),
            policy: TacticalPolicy::default(),
            allow_correction: false,
            colour: Colour::BLACK,
            track_colour: Colour::BLACK,
            leg: Leg {
                start: position,
                ..Leg::default()
            },
            track: Track::default(),
        }
    }

    /// Begin a leg to `next` from the current position.
    pub fn start_leg(
        &mut self,
        name: &str,
        next: Option<String>,
        course: &Course,
    ) -> Result<(), SimError> {
        self.leg.start = self.position;
        self.leg.following = match &next {
            None => None,
            Some(mark) => lookup(course, name, mark)?.next_mark.clone(),
        };
        if let Some(following) = &self.leg.following {
            lookup(course, name, following)?;
        }
        self.leg.next = next;
        Ok(())
    }

    /// Forget the course.
    pub fn clear_legs(&mut self) {
        self.leg.next = None;
        self.leg.following = None;
    }

    /// Sail for one second.
    pub fn advance(
        &mut self,
        name: &str,
        env: &BoatEnvironment,
        secs: u32,
    ) -> Result<Option<SimEvent>, SimError> {
        let mut event = None;
        if self.mode == SailingMode::SailOn {
            let ctx = self.sailing_context(name, env)?;
            let update = fsm::evaluate(&ctx);
            self.allow_correction = update.allow_correction;
            if self.apply(update.decision) {
                tracing::debug!(boat = name, mode = ?self.mode, "sailing mode changed");
            }
            if self.mode == SailingMode::Stopped {
                event = Some(SimEvent::BoatStopped {
                    boat: name.to_string(),
                    secs,
                });
            }
        }

        match self.mode {
            SailingMode::SailOn => self.move_boat(self.heading, env),
            SailingMode::Stopped => {}
            SailingMode::Turn => self.turn(env),
            SailingMode::MarkRounding => {
                self.turn(env);
                if self.mode == SailingMode::SailOn {
                    let rounded = self.leg.next.clone().unwrap_or_default();
                    let next = self.leg.following.clone();
                    self.start_leg(name, next, env.course)?;
                    tracing::debug!(boat = name, mark = %rounded, "mark rounded");
                    event = Some(SimEvent::MarkRounded {
                        boat: name.to_string(),
                        mark: rounded,
                        secs,
                    });
                }
            }
        }
        Ok(event)
    }

    /// Gather the decision inputs for this second.
    pub fn sailing_context(
        &self,
        name: &str,
        env: &BoatEnvironment,
    ) -> Result<SailingContext, SimError> {
        let wind = env.wind.flow_at(self.position).from;
        let course = match &self.leg.next {
            None => None,
            Some(next) => {
                let mark = lookup(env.course, name, next)?;
                let following_bearing = match &self.leg.following {
                    None => None,
                    Some(following) => Some(Direction::between(
                        mark.location,
                        lookup(env.course, name, following)?.location,
                    )),
                };
                Some(CourseSituation::measure(
                    self.position,
                    self.heading,
                    wind,
                    mark.location,
                    mark.leave_to,
                    self.metrics.clearance(),
                    self.leg.start,
                    following_bearing,
                ))
            }
        };
        Ok(SailingContext {
            position: self.position,
            heading: self.heading,
            speed: self.speed,
            wind,
            tack: SailingContext::tack_for(self.heading, wind),
            boat_angle_to_wind: self.heading.abs_angle_diff(&wind),
            wind_angle_to_mean: wind.angle_diff(&env.wind.mean_flow().from),
            upwind_angle: self.metrics.upwind_angle,
            downwind_angle: self.metrics.downwind_angle,
            close_distance: self.metrics.close_distance(),
            close_angle: self.close_angle,
            limits: Some(env.limits),
            policy: self.policy,
            course,
            allow_correction: self.allow_correction,
        })
    }

    /// Switch mode for a decision. Returns whether the mode changed.
    fn apply(&mut self, decision: Decision) -> bool {
        let before = self.mode;
        match decision {
            Decision::SailOn => {}
            Decision::Stop => self.mode = SailingMode::Stopped,
            Decision::Turn { target, side } => {
                self.target_heading = target;
                self.turn_side = side;
                self.mode = SailingMode::Turn;
            }
            Decision::RoundMark { target, side } => {
                self.target_heading = target;
                self.turn_side = side;
                self.mode = SailingMode::MarkRounding;
            }
        }
        before != self.mode
    }

    fn turn(&mut self, env: &BoatEnvironment) {
        let (heading, done) =
            fsm::turn_step(self.heading, self.target_heading, self.turn_side, self.turn_rate);
        self.move_boat(heading, env);
        if done {
            self.mode = SailingMode::SailOn;
        }
    }

    /// Sail one second on `required`, easing speed toward the table value
    /// and drifting with the water.
    pub fn move_boat(&mut self, required: Direction, env: &BoatEnvironment) {
        let wind = env.wind.flow_at(self.position);
        let water = env.water.flow_at(self.position);
        let potential = knots_to_metres_per_second(
            self.table
                .potential_speed(required.abs_angle_diff(&wind.from), wind.knots),
        );
        self.speed += self.metrics.inertia * (potential - self.speed);

        let movement =
            Polar::new(self.speed, required) - Polar::new(water.metres_per_second(), water.from);
        self.position = movement.to_location(self.position);
        self.track.push(self.position);
        self.heading = required;
        self.turn_rate = self.metrics.turn_rate(self.speed);
        self.close_angle = BoatMetrics::close_angle(self.turn_rate);
    }

    pub fn tack(&self, wind: Direction) -> Side {
        SailingContext::tack_for(self.heading, wind)
    }

    /// Boom angle off the centreline, negative on starboard tack.
    pub fn sail_angle(&self, wind: Direction) -> i32 {
        let relative = self.heading.angle_diff(&wind);
        let off = relative.abs();
        let rotation = if off <= 45 { 0 } else { (off - 45) * 2 / 3 };
        if relative > 0 {
            -rotation
        } else {
            rotation
        }
    }

    pub fn view(&self, name: &str, wind_field: &FlowField, course: &Course) -> BoatView {
        let wind = wind_field.flow_at(self.position);
        BoatView {
            name: name.to_string(),
            class: self.class,
            position: self.position,
            heading: self.heading.degrees(),
            speed: self.speed,
            mode: self.mode,
            tack: self.tack(wind.from),
            sail_angle: self.sail_angle(wind.from),
            next_mark: self.leg.next.clone(),
            following_mark: self.leg.following.clone(),
            distance_to_mark: self
                .leg
                .next
                .as_deref()
                .and_then(|next| course.get(next))
                .map(|mark| self.position.distance_to(&mark.location)),
            wind,
            colour: self.colour,
            track_colour: self.track_colour,
            track: self.track.snapshot(),
        }
    }
}

fn lookup<'a>(course: &'a Course, boat: &str, mark: &str) -> Result<&'a CourseMark, SimError> {
    course.get(mark).ok_or_else(|| SimError::UnknownMark {
        boat: boat.to_string(),
        mark: mark.to_string(),
    })
}

type Field = ParamField<Boat>;

fn channel(slot: &mut Option<Channel>) -> &mut Channel {
    slot.get_or_insert_with(Channel::default)
}

fn schema() -> &'static ParamSchema<Boat> {
    static SCHEMA: OnceLock<ParamSchema<Boat>> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        ParamSchema::new(vec![
            Field::integer("heading", |b: &mut Boat, v| {
                b.heading = Direction::from_degrees(f64::from(v));
                b.target_heading = b.heading;
            }),
            Field::location("location", |b: &mut Boat, v| {
                b.position = v;
                b.leg.start = v;
            }),
            Field::colour("colour", |b: &mut Boat, v| {
                b.colour = v;
                b.track_colour = v;
            }),
            Field::colour("trackcolour", |b: &mut Boat, v| b.track_colour = v),
            Field::yes_no("upwindsailonbesttack", |b: &mut Boat, v| {
                b.policy.upwind_best_tack = v
            }),
            Field::yes_no("upwindtackifheaded", |b: &mut Boat, v| {
                b.policy.upwind_tack_if_headed = v
            }),
            Field::yes_no("upwindbearawayifheaded", |b: &mut Boat, v| {
                b.policy.upwind_bear_away_if_headed = v
            }),
            Field::yes_no("upwindluffupiflifted", |b: &mut Boat, v| {
                b.policy.upwind_luff_if_lifted = v
            }),
            Field::yes_no("reachdownwind", |b: &mut Boat, v| b.policy.reach_downwind = v),
            Field::yes_no("downwindsailonbestgybe", |b: &mut Boat, v| {
                b.policy.downwind_best_gybe = v
            }),
            Field::yes_no("downwindbearawayifheaded", |b: &mut Boat, v| {
                b.policy.downwind_bear_away_if_headed = v
            }),
            Field::yes_no("downwindgybeiflifted", |b: &mut Boat, v| {
                b.policy.downwind_gybe_if_lifted = v
            }),
            Field::yes_no("downwindluffupiflifted", |b: &mut Boat, v| {
                b.policy.downwind_luff_if_lifted = v
            }),
            Field::real("upwindchannel", |b: &mut Boat, v| {
                b.policy.upwind_channel = Some(Channel {
                    left: v / 2.0,
                    right: v / 2.0,
                })
            }),
            Field::real("upwindchannelleft", |b: &mut Boat, v| {
                channel(&mut b.policy.upwind_channel).left = v
            }),
            Field::real("upwindchannelright", |b: &mut Boat, v| {
                channel(&mut b.policy.upwind_channel).right = v
            }),
            Field::real("downwindchannel", |b: &mut Boat, v| {
                b.policy.downwind_channel = Some(Channel {
                    left: v / 2.0,
                    right: v / 2.0,
                })
            }),
            Field::real("downwindchannelleft", |b: &mut Boat, v| {
                channel(&mut b.policy.downwind_channel).left = v
            }),
            Field::real("downwindchannelright", |b: &mut Boat, v| {
                channel(&mut b.policy.downwind_channel).right = v
            }),
        ])
    })
}

impl Parameterised for Boat {
    fn schema(&self) -> &'static ParamSchema<Self> {
        schema()
    }
}
