//! Static element class registry.
//!
//! Maps the class names used in scenario definitions to the element kinds
//! the engine can build. There is no runtime discovery: every class is
//! listed here.

use racetrainer_core::enums::{BoatClass, FlowVariant};
use racetrainer_flow::variants;
use racetrainer_tactics::profiles;

/// The kind of element a class name builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Flow(FlowVariant),
    Mark,
    Boat(BoatClass),
}

pub const MARK_CLASS: &str = "mark";

/// Resolve a class name.
pub fn lookup(class: &str) -> Option<ElementKind> {
    if class == MARK_CLASS {
        return Some(ElementKind::Mark);
    }
    variants::variant_for_class(class)
        .map(ElementKind::Flow)
        .or_else(|| profiles::class_for_name(class).map(ElementKind::Boat))
}
