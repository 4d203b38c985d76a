//! Parameter mapping
//!
//! For every simulation condition of the measurement table the engine
//! produces a [`ParameterMapping`]: model-native name to literal value or
//! parameter id, with the scale of each entry. Conditions with a
//! preequilibration condition get a second, independent mapping for the
//! preequilibration stage.
//!
//! ```
//! use petab_rs::conditions::{ConditionRecord, ConditionTable};
//! use petab_rs::mapping::{MappingConfig, ParameterMappingEngine};
//! use petab_rs::measurements::{MeasurementRecord, MeasurementTable};
//! use petab_rs::model::SimpleModel;
//! use petab_rs::observables::{ObservableRecord, ObservableTable};
//! use petab_rs::parameters::{ParameterRecord, ParameterTable, Scale};
//! use petab_rs::ParameterValue;
//!
//! let model = SimpleModel::new().with_parameter("p1", 1.0).with_entity("x");
//! let conditions = ConditionTable::new(vec![ConditionRecord::new("c1").with_override("p1", 3.0)]).unwrap();
//! let observables = ObservableTable::new(vec![ObservableRecord::new("obs", "x", "sigma")]).unwrap();
//! let measurements = MeasurementTable::new(vec![MeasurementRecord::new("obs", "c1", 0.0, 1.0)]);
//! let parameters = ParameterTable::new(vec![
//!     ParameterRecord::new("sigma", 0.1, 0.01, 1.0, Scale::Log10, true).unwrap(),
//! ]).unwrap();
//!
//! let result = ParameterMappingEngine::new(MappingConfig::default())
//!     .compute(&conditions, &measurements, &parameters, &observables, &model)
//!     .unwrap();
//! let mapping = &result.mappings[0].simulation;
//! assert_eq!(mapping.get("p1"), Some(&ParameterValue::Numeric(3.0)));
//! assert_eq!(mapping.scale_of("sigma"), Some(Scale::Log10));
//! ```

pub mod config;
pub mod engine;

pub use config::MappingConfig;
pub use engine::ParameterMappingEngine;

use crate::measurements::SimulationCondition;
use crate::parameters::Scale;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping of model-native names to values, with a parallel scale map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterMapping {
    values: BTreeMap<String, ParameterValue>,
    scales: BTreeMap<String, Scale>,
}

impl ParameterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for `name`, replacing any previous one
    pub fn insert(&mut self, name: &str, value: ParameterValue, scale: Scale) {
        self.values.insert(name.to_string(), value);
        self.scales.insert(name.to_string(), scale);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn scale_of(&self, name: &str) -> Option<Scale> {
        self.scales.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue, Scale)> {
        self.values.iter().map(move |(name, value)| {
            let scale = self.scales.get(name).copied().unwrap_or_default();
            (name.as_str(), value, scale)
        })
    }

    pub fn values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.values
    }

    pub fn scales(&self) -> &BTreeMap<String, Scale> {
        &self.scales
    }

    /// Parameter ids referenced symbolically, sorted and unique
    pub fn parameter_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.values.values().filter_map(ParameterValue::as_parameter).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Mappings of one simulation condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionMapping {
    pub condition: SimulationCondition,
    pub simulation: ParameterMapping,
    pub preequilibration: Option<ParameterMapping>,
}

/// Something the engine left unresolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingWarning {
    /// No measurement row supplies an override for the placeholder
    UnmappedPlaceholder {
        condition: String,
        observable_id: String,
        placeholder: String,
    },
    /// `name` maps to a parameter id absent from the parameter table
    UnmappedParameter {
        condition_id: String,
        name: String,
        parameter: String,
    },
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingWarning::UnmappedPlaceholder {
                condition,
                observable_id,
                placeholder,
            } => write!(
                f,
                "no override for placeholder '{}' of observable '{}' in condition '{}'",
                placeholder, observable_id, condition
            ),
            MappingWarning::UnmappedParameter {
                condition_id,
                name,
                parameter,
            } => write!(
                f,
                "'{}' maps to '{}' in condition '{}', which is not in the parameter table",
                name, parameter, condition_id
            ),
        }
    }
}

/// Mappings in first-occurrence order of the simulation conditions, plus all
/// warnings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingResult {
    pub mappings: Vec<ConditionMapping>,
    pub warnings: Vec<MappingWarning>,
}

impl MappingResult {
    /// Mapping for a given simulation condition
    pub fn get(&self, condition: &SimulationCondition) -> Option<&ConditionMapping> {
        self.mappings.iter().find(|m| &m.condition == condition)
    }
}
