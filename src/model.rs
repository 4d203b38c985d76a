//! Model collaborator
//!
//! The mapping engine never parses model files. It only asks a [`Model`] for
//! its native parameters, whether a symbol names a model entity, and which
//! symbols are defined by assignment rules. Any model format (e.g. SBML
//! loaded elsewhere) can be plugged in by implementing the trait;
//! [`SimpleModel`] is an in-memory implementation.

use serde::{Deserialize, Serialize};

/// Read-only queries the core needs from a dynamical model
pub trait Model: Sync {
    /// Native parameter ids with their default values, in model order
    fn parameters(&self) -> Vec<(String, f64)>;

    /// Whether `id` names any model entity (parameter, species, compartment,
    /// rule target, ...)
    fn has_entity(&self, id: &str) -> bool;

    /// Formula of the assignment rule defining `id`, if any
    fn formula(&self, id: &str) -> Option<String>;

    /// Symbols defined by assignment rules
    fn assignment_rule_targets(&self) -> Vec<String>;

    /// Default value of a native parameter
    fn parameter_value(&self, id: &str) -> Option<f64> {
        self.parameters()
            .into_iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, value)| value)
    }

    /// Whether `id` is a native parameter of the model
    fn has_parameter(&self, id: &str) -> bool {
        self.parameter_value(id).is_some()
    }
}

/// In-memory model: parameters with defaults, other entities (species,
/// compartments) and assignment rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleModel {
    parameters: Vec<(String, f64)>,
    entities: Vec<String>,
    assignment_rules: Vec<(String, String)>,
}

impl SimpleModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a native parameter with its default value
    pub fn with_parameter(mut self, id: &str, value: f64) -> Self {
        self.parameters.push((id.to_string(), value));
        self
    }

    /// Add a non-parameter entity such as a species
    pub fn with_entity(mut self, id: &str) -> Self {
        self.entities.push(id.to_string());
        self
    }

    /// Add an assignment rule `target = formula`
    pub fn with_assignment_rule(mut self, target: &str, formula: &str) -> Self {
        self.assignment_rules
            .push((target.to_string(), formula.to_string()));
        self
    }
}

impl Model for SimpleModel {
    fn parameters(&self) -> Vec<(String, f64)> {
        self.parameters.clone()
    }

    fn has_entity(&self, id: &str) -> bool {
        self.parameters.iter().any(|(pid, _)| pid == id)
            || self.entities.iter().any(|e| e == id)
            || self.assignment_rules.iter().any(|(target, _)| target == id)
    }

    fn formula(&self, id: &str) -> Option<String> {
        self.assignment_rules
            .iter()
            .find(|(target, _)| target == id)
            .map(|(_, formula)| formula.clone())
    }

    fn assignment_rule_targets(&self) -> Vec<String> {
        self.assignment_rules
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }

    fn parameter_value(&self, id: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, value)| *value)
    }
}
