//! Wind and water flow fields.
//!
//! One configurable field type interpolates four corner flows over the
//! play area and layers a periodic swing and a stepped shift on top.
//! Variants only differ in their default corners and shorthand keys.

pub mod field;
pub mod perturbation;
pub mod variants;

pub use field::FlowField;
pub use racetrainer_core as core;
