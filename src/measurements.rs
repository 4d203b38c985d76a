//! Measurement table and measurement-specific override resolution
//!
//! Measurement rows are grouped by (simulation condition, preequilibration
//! condition, observable). Within a group every row should supply the same
//! observable and noise parameter overrides; rows that disagree make the
//! override timepoint specific, which is only accepted for numeric noise
//! parameters and only when explicitly allowed.

use crate::error::{PetabError, Result};
use crate::observables::{ObservableResolver, ObservableTable, PlaceholderKind};
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// One scalar measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub observable_id: String,
    pub simulation_condition_id: String,
    #[serde(default)]
    pub preequilibration_condition_id: Option<String>,
    pub time: f64,
    pub measurement: f64,
    #[serde(default)]
    pub observable_parameters: Vec<ParameterValue>,
    #[serde(default)]
    pub noise_parameters: Vec<ParameterValue>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub replicate_id: Option<String>,
}

impl MeasurementRecord {
    pub fn new(observable_id: &str, simulation_condition_id: &str, time: f64, measurement: f64) -> Self {
        Self {
            observable_id: observable_id.to_string(),
            simulation_condition_id: simulation_condition_id.to_string(),
            preequilibration_condition_id: None,
            time,
            measurement,
            observable_parameters: Vec::new(),
            noise_parameters: Vec::new(),
            dataset_id: None,
            replicate_id: None,
        }
    }

    /// Set the preequilibration condition. An empty id means none.
    pub fn with_preequilibration(mut self, condition_id: &str) -> Self {
        self.preequilibration_condition_id =
            (!condition_id.trim().is_empty()).then(|| condition_id.trim().to_string());
        self
    }

    pub fn with_observable_parameters(mut self, overrides: Vec<ParameterValue>) -> Self {
        self.observable_parameters = overrides;
        self
    }

    pub fn with_noise_parameters(mut self, overrides: Vec<ParameterValue>) -> Self {
        self.noise_parameters = overrides;
        self
    }

    pub fn with_dataset_id(mut self, dataset_id: &str) -> Self {
        self.dataset_id = Some(dataset_id.to_string());
        self
    }

    pub fn with_replicate_id(mut self, replicate_id: &str) -> Self {
        self.replicate_id = Some(replicate_id.to_string());
        self
    }

    /// The simulation condition this row belongs to
    pub fn simulation_condition(&self) -> SimulationCondition {
        SimulationCondition {
            simulation_condition_id: self.simulation_condition_id.clone(),
            preequilibration_condition_id: self.preequilibration_condition_id.clone(),
        }
    }

    pub fn overrides(&self, kind: PlaceholderKind) -> &[ParameterValue] {
        match kind {
            PlaceholderKind::Observable => &self.observable_parameters,
            PlaceholderKind::Noise => &self.noise_parameters,
        }
    }
}

/// A unique (simulation condition, preequilibration condition) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimulationCondition {
    pub simulation_condition_id: String,
    pub preequilibration_condition_id: Option<String>,
}

impl SimulationCondition {
    pub fn new(simulation_condition_id: &str, preequilibration_condition_id: Option<&str>) -> Self {
        Self {
            simulation_condition_id: simulation_condition_id.to_string(),
            preequilibration_condition_id: preequilibration_condition_id.map(str::to_string),
        }
    }
}

impl fmt::Display for SimulationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.preequilibration_condition_id {
            Some(preeq) => write!(f, "{} (preequilibration: {})", self.simulation_condition_id, preeq),
            None => f.write_str(&self.simulation_condition_id),
        }
    }
}

/// The measurement table, already concatenated from all input files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementTable {
    records: Vec<MeasurementRecord>,
}

impl MeasurementTable {
    pub fn new(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records.iter()
    }

    /// Unique simulation conditions in first-occurrence order
    pub fn simulation_conditions(&self) -> Vec<SimulationCondition> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(MeasurementRecord::simulation_condition)
            .filter(|condition| seen.insert(condition.clone()))
            .collect()
    }

    /// Rows measured under `condition`
    pub fn rows_for<'a>(
        &'a self,
        condition: &'a SimulationCondition,
    ) -> impl Iterator<Item = &'a MeasurementRecord> + 'a {
        self.records.iter().filter(move |r| {
            r.simulation_condition_id == condition.simulation_condition_id
                && r.preequilibration_condition_id == condition.preequilibration_condition_id
        })
    }

    /// Parameter ids used symbolically in override columns, first-seen order
    pub fn parameter_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|r| r.observable_parameters.iter().chain(r.noise_parameters.iter()))
            .filter_map(ParameterValue::as_parameter)
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    /// Condition ids referenced as simulation or preequilibration condition
    pub fn condition_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|r| {
                std::iter::once(r.simulation_condition_id.as_str())
                    .chain(r.preequilibration_condition_id.as_deref())
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Resolution of one placeholder within a measurement group
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderValue {
    /// Same override on every row of the group
    Override(ParameterValue),
    /// Numeric values differing between rows; the simulator takes them
    /// per row from the measurement table
    TimepointSpecific,
    /// No override supplied anywhere in the group
    Unmapped,
}

/// Resolved overrides of one (condition, observable) group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOverrides {
    pub condition: SimulationCondition,
    pub observable_id: String,
    /// Observable placeholders first, then noise placeholders, each in
    /// numbering order
    pub placeholders: Vec<(String, PlaceholderValue)>,
}

/// Groups measurement rows and resolves their placeholder overrides
pub struct MeasurementOverrideResolver<'a> {
    measurements: &'a MeasurementTable,
    observables: &'a ObservableTable,
    allow_timepoint_specific_numeric_noise_parameters: bool,
}

impl<'a> MeasurementOverrideResolver<'a> {
    pub fn new(
        measurements: &'a MeasurementTable,
        observables: &'a ObservableTable,
        allow_timepoint_specific_numeric_noise_parameters: bool,
    ) -> Self {
        Self {
            measurements,
            observables,
            allow_timepoint_specific_numeric_noise_parameters,
        }
    }

    /// Rows grouped by (simulation condition, observable), first-occurrence order
    pub fn groups(&self) -> Vec<(SimulationCondition, &'a str, Vec<&'a MeasurementRecord>)> {
        let mut index: HashMap<(SimulationCondition, &'a str), usize> = HashMap::new();
        let mut groups: Vec<(SimulationCondition, &'a str, Vec<&'a MeasurementRecord>)> = Vec::new();
        for row in self.measurements.iter() {
            let key = (row.simulation_condition(), row.observable_id.as_str());
            match index.get(&key) {
                Some(&i) => groups[i].2.push(row),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key.0, key.1, vec![row]));
                }
            }
        }
        groups
    }

    /// Resolve every group. Fails on unknown observables, override lists
    /// that do not match the formula's placeholders, and disallowed
    /// timepoint-specific overrides.
    pub fn resolve(&self) -> Result<Vec<GroupOverrides>> {
        let resolver = ObservableResolver::new(self.observables);
        self.groups()
            .into_iter()
            .map(|(condition, observable_id, rows)| {
                let mut placeholders = Vec::new();
                for kind in [PlaceholderKind::Observable, PlaceholderKind::Noise] {
                    let names = resolver.placeholders(observable_id, kind)?;
                    let values = self.resolve_column(&condition, observable_id, &rows, kind, names.len())?;
                    placeholders.extend(names.into_iter().zip(values));
                }
                Ok(GroupOverrides {
                    condition,
                    observable_id: observable_id.to_string(),
                    placeholders,
                })
            })
            .collect()
    }

    fn resolve_column(
        &self,
        condition: &SimulationCondition,
        observable_id: &str,
        rows: &[&MeasurementRecord],
        kind: PlaceholderKind,
        expected: usize,
    ) -> Result<Vec<PlaceholderValue>> {
        let first = rows.first().map(|r| r.overrides(kind)).unwrap_or(&[]);
        let constant = rows.iter().all(|r| r.overrides(kind) == first);

        for row in rows {
            let count = row.overrides(kind).len();
            // an empty cell leaves all placeholders unmapped
            if count != 0 && count != expected {
                return Err(PetabError::InvalidPlaceholder {
                    observable_id: observable_id.to_string(),
                    message: format!(
                        "expected {} {} parameter override(s), got {} in condition '{}'",
                        expected, kind, count, condition
                    ),
                });
            }
        }

        if constant {
            return Ok((0..expected)
                .map(|i| match first.get(i) {
                    Some(value) => PlaceholderValue::Override(value.clone()),
                    None => PlaceholderValue::Unmapped,
                })
                .collect());
        }

        let all_numeric = rows
            .iter()
            .all(|r| r.overrides(kind).len() == expected && r.overrides(kind).iter().all(ParameterValue::is_numeric));
        if kind == PlaceholderKind::Noise && all_numeric && self.allow_timepoint_specific_numeric_noise_parameters {
            debug!(
                condition = %condition,
                observable = observable_id,
                "accepting timepoint-specific numeric noise parameters"
            );
            return Ok(vec![PlaceholderValue::TimepointSpecific; expected]);
        }

        Err(PetabError::TimepointSpecificNumericOverride {
            condition: condition.to_string(),
            observable_id: observable_id.to_string(),
            kind: kind.to_string(),
        })
    }
}
