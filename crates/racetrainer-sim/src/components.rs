//! ECS components shared by marks and boats.

use serde::{Deserialize, Serialize};

/// Instance name from the scenario definition, plus its position in
/// definition order for stable snapshot ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub ordinal: u32,
}

impl Instance {
    pub fn new(name: &str, ordinal: u32) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
        }
    }
}
