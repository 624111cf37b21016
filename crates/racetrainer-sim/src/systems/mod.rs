//! ECS systems that operate on the simulation world each second.
//!
//! Systems are plain functions over the `World`; the engine owns every
//! other piece of state and passes in what each system reads.

pub mod boats;
pub mod marks;
pub mod snapshot;
