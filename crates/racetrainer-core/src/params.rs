//! Element parameters: value parsers, per-type key schemas and error
//! accumulation.
//!
//! Every configurable entity exposes a [`ParamSchema`] mapping each key it
//! accepts to a parser and a setter. Setting a key runs both; checking a key
//! runs only the parser, so overrides can be validated before the clock
//! starts without touching live state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::ParamStatus;
use crate::error::ScenarioErrors;
use crate::types::Location;

/// RGBA display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);
    pub const CYAN: Colour = Colour::rgb(0, 255, 255);
    pub const DARK_GREY: Colour = Colour::rgb(64, 64, 64);
    pub const GREY: Colour = Colour::rgb(128, 128, 128);
    pub const GREEN: Colour = Colour::rgb(0, 255, 0);
    pub const LIGHT_GREY: Colour = Colour::rgb(192, 192, 192);
    pub const MAGENTA: Colour = Colour::rgb(255, 0, 255);
    pub const ORANGE: Colour = Colour::rgb(255, 200, 0);
    pub const PINK: Colour = Colour::rgb(255, 175, 175);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const YELLOW: Colour = Colour::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Why a raw parameter value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("expected yes or no, got {0:?}")]
    NotYesNo(String),
    #[error("expected an integer, got {0:?}")]
    NotInteger(String),
    #[error("expected a number, got {0:?}")]
    NotNumber(String),
    #[error("location should be defined as two numbers, got {0:?}")]
    NotLocation(String),
    #[error("not a colour name or 3-4 components in 0-255, got {0:?}")]
    NotColour(String),
}

/// One `key=value` pair as handed over by the scenario parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Build a key/value list from string pairs.
pub fn key_values(pairs: &[(&str, &str)]) -> Vec<KeyValue> {
    pairs.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect()
}

// --- Parsers ---

pub fn parse_yes_no(raw: &str) -> Result<bool, ParamError> {
    match raw.trim() {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(ParamError::NotYesNo(raw.to_string())),
    }
}

pub fn parse_integer(raw: &str) -> Result<i32, ParamError> {
    raw.trim()
        .parse()
        .map_err(|_| ParamError::NotInteger(raw.to_string()))
}

pub fn parse_real(raw: &str) -> Result<f64, ParamError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParamError::NotNumber(raw.to_string())),
    }
}

/// `"x,y"` in metres.
pub fn parse_location(raw: &str) -> Result<Location, ParamError> {
    let bad = || ParamError::NotLocation(raw.to_string());
    let coords: Vec<&str> = raw.split(',').collect();
    if coords.len() != 2 {
        return Err(bad());
    }
    let x = parse_real(coords[0]).map_err(|_| bad())?;
    let y = parse_real(coords[1]).map_err(|_| bad())?;
    Ok(Location::new(x, y))
}

/// A named colour, or `r,g,b` / `r,g,b,a` with components in 0-255.
pub fn parse_colour(raw: &str) -> Result<Colour, ParamError> {
    let named = match raw.trim() {
        "black" => Some(Colour::BLACK),
        "blue" => Some(Colour::BLUE),
        "cyan" => Some(Colour::CYAN),
        "darkgrey" => Some(Colour::DARK_GREY),
        "grey" => Some(Colour::GREY),
        "green" => Some(Colour::GREEN),
        "lightgrey" => Some(Colour::LIGHT_GREY),
        "magenta" => Some(Colour::MAGENTA),
        "orange" => Some(Colour::ORANGE),
        "pink" => Some(Colour::PINK),
        "red" => Some(Colour::RED),
        "white" => Some(Colour::WHITE),
        "yellow" => Some(Colour::YELLOW),
        _ => None,
    };
    if let Some(colour) = named {
        return Ok(colour);
    }

    let bad = || ParamError::NotColour(raw.to_string());
    let parts: Vec<&str> = raw.split(',').collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(bad());
    }
    let mut rgba = [255u8; 4];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part.trim().parse().map_err(|_| bad())?;
    }
    Ok(Colour {
        r: rgba[0],
        g: rgba[1],
        b: rgba[2],
        a: rgba[3],
    })
}

// --- Schemas ---

enum Setter<T> {
    YesNo(fn(&mut T, bool)),
    Integer(fn(&mut T, i32)),
    Real(fn(&mut T, f64)),
    Location(fn(&mut T, Location)),
    Colour(fn(&mut T, Colour)),
    Text(fn(&mut T, &str)),
}

/// A single accepted key: its parser is implied by the setter's value type.
pub struct ParamField<T> {
    key: &'static str,
    setter: Setter<T>,
}

impl<T> ParamField<T> {
    pub fn yes_no(key: &'static str, set: fn(&mut T, bool)) -> Self {
        Self {
            key,
            setter: Setter::YesNo(set),
        }
    }

    pub fn integer(key: &'static str, set: fn(&mut T, i32)) -> Self {
        Self {
            key,
            setter: Setter::Integer(set),
        }
    }

    pub fn real(key: &'static str, set: fn(&mut T, f64)) -> Self {
        Self {
            key,
            setter: Setter::Real(set),
        }
    }

    pub fn location(key: &'static str, set: fn(&mut T, Location)) -> Self {
        Self {
            key,
            setter: Setter::Location(set),
        }
    }

    pub fn colour(key: &'static str, set: fn(&mut T, Colour)) -> Self {
        Self {
            key,
            setter: Setter::Colour(set),
        }
    }

    pub fn text(key: &'static str, set: fn(&mut T, &str)) -> Self {
        Self {
            key,
            setter: Setter::Text(set),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    fn check(&self, raw: &str) -> Result<(), ParamError> {
        match self.setter {
            Setter::YesNo(_) => parse_yes_no(raw).map(drop),
            Setter::Integer(_) => parse_integer(raw).map(drop),
            Setter::Real(_) => parse_real(raw).map(drop),
            Setter::Location(_) => parse_location(raw).map(drop),
            Setter::Colour(_) => parse_colour(raw).map(drop),
            Setter::Text(_) => Ok(()),
        }
    }

    fn apply(&self, target: &mut T, raw: &str) -> Result<(), ParamError> {
        match self.setter {
            Setter::YesNo(set) => set(target, parse_yes_no(raw)?),
            Setter::Integer(set) => set(target, parse_integer(raw)?),
            Setter::Real(set) => set(target, parse_real(raw)?),
            Setter::Location(set) => set(target, parse_location(raw)?),
            Setter::Colour(set) => set(target, parse_colour(raw)?),
            Setter::Text(set) => set(target, raw.trim()),
        }
        Ok(())
    }
}

/// The keys accepted by one entity type.
pub struct ParamSchema<T> {
    fields: Vec<ParamField<T>>,
}

impl<T> ParamSchema<T> {
    /// Build a schema. Panics on a duplicate key: schemas are built once per
    /// type from static tables, so a duplicate is a programming error.
    pub fn new(fields: Vec<ParamField<T>>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            assert!(
                fields[..i].iter().all(|f| f.key != field.key),
                "duplicate parameter key {:?}",
                field.key
            );
        }
        Self { fields }
    }

    fn field(&self, key: &str) -> Option<&ParamField<T>> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }

    pub fn set(&self, target: &mut T, key: &str, raw: &str) -> ParamStatus {
        match self.field(key) {
            None => ParamStatus::BadKey,
            Some(field) => match field.apply(target, raw) {
                Ok(()) => ParamStatus::Ok,
                Err(_) => ParamStatus::BadValue,
            },
        }
    }

    pub fn check(&self, key: &str, raw: &str) -> ParamStatus {
        match self.field(key) {
            None => ParamStatus::BadKey,
            Some(field) => match field.check(raw) {
                Ok(()) => ParamStatus::Ok,
                Err(_) => ParamStatus::BadValue,
            },
        }
    }
}

/// An entity configurable through key/value parameters.
pub trait Parameterised: Sized + 'static {
    /// The schema for this instance. Instances of one type may differ (flow
    /// variants accept extra keys).
    fn schema(&self) -> &'static ParamSchema<Self>;

    fn set_parameter(&mut self, key: &str, raw: &str) -> ParamStatus {
        let schema = self.schema();
        schema.set(self, key, raw)
    }

    fn check_parameter(&self, key: &str, raw: &str) -> ParamStatus {
        self.schema().check(key, raw)
    }

    /// Apply `params` in order, recording every failure against `name`.
    fn set_parameters(&mut self, name: &str, params: &[KeyValue], errors: &mut ParamErrors) {
        for kv in params {
            let status = self.set_parameter(&kv.key, &kv.value);
            errors.record(status, name, kv);
        }
    }

    /// Validate `params` without mutating, recording every failure.
    fn check_parameters(&self, name: &str, params: &[KeyValue], errors: &mut ParamErrors) {
        for kv in params {
            let status = self.check_parameter(&kv.key, &kv.value);
            errors.record(status, name, kv);
        }
    }
}

/// Accumulated configuration error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamErrors {
    messages: Vec<String>,
}

impl ParamErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: ParamStatus, name: &str, kv: &KeyValue) {
        match status {
            ParamStatus::Ok => {}
            ParamStatus::BadKey => self.messages.push(format!(
                "Attempting to set undefined key ({}.{}={})",
                name, kv.key, kv.value
            )),
            ParamStatus::BadValue => self.messages.push(format!(
                "Attempting to set key with bad value ({}.{}={})",
                name, kv.key, kv.value
            )),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn missing_instance(&mut self, name: &str) {
        self.messages
            .push(format!("instance does not exist ({})", name));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ScenarioErrors> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ScenarioErrors(self.messages))
        }
    }
}

impl fmt::Display for ParamErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            writeln!(f, "{}", message)?;
        }
        Ok(())
    }
}
