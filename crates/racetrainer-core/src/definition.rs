//! Parsed scenario definitions, as handed over by the scenario-file parser.

use serde::{Deserialize, Serialize};

use crate::params::{key_values, KeyValue};

/// One element instance: a name, a registered class and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub name: String,
    pub class: String,
    pub params: Vec<KeyValue>,
}

/// Parameters to apply to an existing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub instance: String,
    pub params: Vec<KeyValue>,
}

/// An override applied just before the tick for `secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOverride {
    pub secs: u32,
    pub target: Override,
}

/// An override applied when `key` is pressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub target: Override,
}

/// A complete scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub title: String,
    /// Scenario-wide settings (bounds, limits, display, first mark).
    pub scenario: Vec<KeyValue>,
    /// Elements in definition order; `wind` and `water` are optional.
    pub elements: Vec<ElementDefinition>,
    pub scheduled: Vec<ScheduledOverride>,
    pub key_bindings: Vec<KeyBinding>,
}

impl ElementDefinition {
    pub fn new(name: &str, class: &str, params: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            class: class.to_string(),
            params: key_values(params),
        }
    }
}

impl Override {
    pub fn new(instance: &str, params: &[(&str, &str)]) -> Self {
        Self {
            instance: instance.to_string(),
            params: key_values(params),
        }
    }
}

impl ScenarioDefinition {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_settings(mut self, params: &[(&str, &str)]) -> Self {
        self.scenario.extend(key_values(params));
        self
    }

    pub fn with_element(mut self, name: &str, class: &str, params: &[(&str, &str)]) -> Self {
        self.elements.push(ElementDefinition::new(name, class, params));
        self
    }

    pub fn with_scheduled(mut self, secs: u32, instance: &str, params: &[(&str, &str)]) -> Self {
        self.scheduled.push(ScheduledOverride {
            secs,
            target: Override::new(instance, params),
        });
        self
    }

    pub fn with_key(mut self, key: &str, instance: &str, params: &[(&str, &str)]) -> Self {
        self.key_bindings.push(KeyBinding {
            key: key.to_string(),
            target: Override::new(instance, params),
        });
        self
    }

    pub fn element(&self, name: &str) -> Option<&ElementDefinition> {
        self.elements.iter().find(|e| e.name == name)
    }
}
