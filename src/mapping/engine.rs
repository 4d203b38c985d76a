//! The parameter mapping engine.
//!
//! Every simulation condition is mapped by layering, in increasing
//! precedence, model defaults, condition-table overrides, placeholder
//! substitution for the observables measured in the condition, and finally
//! resolution against the parameter table. Conditions are independent of
//! each other, so with the `parallel` feature they are mapped on the rayon
//! thread pool.

use std::collections::{BTreeMap, HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::conditions::{ConditionResolver, ConditionTable};
use crate::error::{PetabError, Result};
use crate::measurements::{
    GroupOverrides, MeasurementOverrideResolver, MeasurementTable, PlaceholderValue, SimulationCondition,
};
use crate::model::Model;
use crate::observables::{ObservableResolver, ObservableTable};
use crate::parameters::{ParameterTable, Scale};
use crate::value::ParameterValue;

use super::config::MappingConfig;
use super::{ConditionMapping, MappingResult, MappingWarning, ParameterMapping};

/// Computes parameter mappings for all simulation conditions.
#[derive(Debug, Clone, Default)]
pub struct ParameterMappingEngine {
    config: MappingConfig,
}

impl ParameterMappingEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: MappingConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the default configuration.
    pub fn with_default_config() -> Self {
        Self::default()
    }

    pub fn with_warn_unmapped(mut self, warn_unmapped: bool) -> Self {
        self.config.warn_unmapped = warn_unmapped;
        self
    }

    pub fn with_scaled_parameters(mut self, scaled_parameters: bool) -> Self {
        self.config.scaled_parameters = scaled_parameters;
        self
    }

    pub fn with_timepoint_specific_numeric_noise_parameters(mut self, allow: bool) -> Self {
        self.config.allow_timepoint_specific_numeric_noise_parameters = allow;
        self
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Map every simulation condition of `measurements`.
    ///
    /// Fails if a measurement row references a condition or observable that
    /// does not exist, on invalid placeholder overrides, and on disallowed
    /// timepoint-specific overrides. Unresolved names do not fail the
    /// computation; they are returned as [`MappingWarning`]s.
    pub fn compute<M: Model + ?Sized>(
        &self,
        conditions: &ConditionTable,
        measurements: &MeasurementTable,
        parameters: &ParameterTable,
        observables: &ObservableTable,
        model: &M,
    ) -> Result<MappingResult> {
        check_references(conditions, measurements, observables)?;

        let groups = MeasurementOverrideResolver::new(
            measurements,
            observables,
            self.config.allow_timepoint_specific_numeric_noise_parameters,
        )
        .resolve()?;
        let mut by_condition: HashMap<&SimulationCondition, Vec<&GroupOverrides>> = HashMap::new();
        for group in &groups {
            by_condition.entry(&group.condition).or_default().push(group);
        }

        let simulation_conditions = measurements.simulation_conditions();
        debug!(
            conditions = simulation_conditions.len(),
            groups = groups.len(),
            "computing parameter mapping"
        );

        let layer = ConditionLayer {
            conditions: ConditionResolver::new(conditions, model).with_parameter_table(parameters),
            observables: ObservableResolver::new(observables),
            parameters,
            model,
            config: &self.config,
        };
        let map_one = |condition: &SimulationCondition| {
            let groups = by_condition.get(condition).map(Vec::as_slice).unwrap_or(&[]);
            layer.map_condition(condition, groups)
        };

        #[cfg(feature = "parallel")]
        let mapped: Vec<(ConditionMapping, Vec<MappingWarning>)> =
            simulation_conditions.par_iter().map(map_one).collect::<Result<_>>()?;
        #[cfg(not(feature = "parallel"))]
        let mapped: Vec<(ConditionMapping, Vec<MappingWarning>)> =
            simulation_conditions.iter().map(map_one).collect::<Result<_>>()?;

        let mut result = MappingResult::default();
        for (mapping, warnings) in mapped {
            result.mappings.push(mapping);
            result.warnings.extend(warnings);
        }
        if self.config.warn_unmapped {
            for warning in &result.warnings {
                warn!("{}", warning);
            }
        }
        Ok(result)
    }
}

/// Every condition and observable referenced by a measurement row must exist.
fn check_references(
    conditions: &ConditionTable,
    measurements: &MeasurementTable,
    observables: &ObservableTable,
) -> Result<()> {
    for row in measurements.iter() {
        let referenced = std::iter::once(&row.simulation_condition_id).chain(row.preequilibration_condition_id.as_ref());
        for condition_id in referenced {
            if !conditions.contains(condition_id) {
                return Err(PetabError::UnknownCondition(condition_id.clone()));
            }
        }
        if !observables.contains(&row.observable_id) {
            return Err(PetabError::UnknownObservable(row.observable_id.clone()));
        }
    }
    Ok(())
}

struct ConditionLayer<'a, M: Model + ?Sized> {
    conditions: ConditionResolver<'a, M>,
    observables: ObservableResolver<'a>,
    parameters: &'a ParameterTable,
    model: &'a M,
    config: &'a MappingConfig,
}

impl<'a, M: Model + ?Sized> ConditionLayer<'a, M> {
    fn map_condition(
        &self,
        condition: &SimulationCondition,
        groups: &[&GroupOverrides],
    ) -> Result<(ConditionMapping, Vec<MappingWarning>)> {
        let mut warnings = Vec::new();

        let mut values = self.conditions.resolve(&condition.simulation_condition_id)?;
        let skip = self.substitute_placeholders(&mut values, condition, groups, &mut warnings)?;
        let simulation = self.resolve_parameters(&condition.simulation_condition_id, values, &skip, &mut warnings);

        let preequilibration = match &condition.preequilibration_condition_id {
            Some(preeq_id) => {
                let values = self.conditions.resolve(preeq_id)?;
                Some(self.resolve_parameters(preeq_id, values, &HashSet::new(), &mut warnings))
            }
            None => None,
        };

        Ok((
            ConditionMapping {
                condition: condition.clone(),
                simulation,
                preequilibration,
            },
            warnings,
        ))
    }

    /// Apply measurement overrides to the placeholders of every observable
    /// measured in the condition. Returns the placeholders left symbolic,
    /// which need no further unmapped-parameter warning.
    fn substitute_placeholders(
        &self,
        values: &mut BTreeMap<String, ParameterValue>,
        condition: &SimulationCondition,
        groups: &[&GroupOverrides],
        warnings: &mut Vec<MappingWarning>,
    ) -> Result<HashSet<String>> {
        let mut symbolic = HashSet::new();
        for group in groups {
            let placeholders: HashMap<&str, &PlaceholderValue> =
                group.placeholders.iter().map(|(name, value)| (name.as_str(), value)).collect();

            let outputs =
                self.observables
                    .output_parameters_for(&[group.observable_id.as_str()], self.model, true, true)?;
            for output in outputs {
                if !placeholders.contains_key(output.as_str()) {
                    values
                        .entry(output.clone())
                        .or_insert(ParameterValue::Parameter(output));
                }
            }

            for (placeholder, value) in &group.placeholders {
                match value {
                    PlaceholderValue::Override(value) => {
                        values.insert(placeholder.clone(), value.clone());
                    }
                    PlaceholderValue::TimepointSpecific => {
                        values.insert(placeholder.clone(), ParameterValue::Parameter(placeholder.clone()));
                        symbolic.insert(placeholder.clone());
                    }
                    PlaceholderValue::Unmapped => {
                        values.insert(placeholder.clone(), ParameterValue::Parameter(placeholder.clone()));
                        symbolic.insert(placeholder.clone());
                        warnings.push(MappingWarning::UnmappedPlaceholder {
                            condition: condition.to_string(),
                            observable_id: group.observable_id.clone(),
                            placeholder: placeholder.clone(),
                        });
                    }
                }
            }
        }
        Ok(symbolic)
    }

    /// Tag every entry with its scale, collapsing fixed parameters to their
    /// nominal values.
    fn resolve_parameters(
        &self,
        condition_id: &str,
        values: BTreeMap<String, ParameterValue>,
        skip: &HashSet<String>,
        warnings: &mut Vec<MappingWarning>,
    ) -> ParameterMapping {
        let mut mapping = ParameterMapping::new();
        for (name, value) in values {
            let (value, scale) = match value {
                ParameterValue::Numeric(v) => (ParameterValue::Numeric(v), Scale::Lin),
                ParameterValue::Parameter(id) => match self.parameters.get(&id) {
                    Some(record) if record.estimate() => (ParameterValue::Parameter(id), record.scale()),
                    Some(record) if self.config.scaled_parameters => {
                        (ParameterValue::Numeric(record.scaled_nominal_value()), record.scale())
                    }
                    Some(record) => (ParameterValue::Numeric(record.nominal_value()), Scale::Lin),
                    None => {
                        if !skip.contains(&id) {
                            warnings.push(MappingWarning::UnmappedParameter {
                                condition_id: condition_id.to_string(),
                                name: name.clone(),
                                parameter: id.clone(),
                            });
                        }
                        (ParameterValue::Parameter(id), Scale::Lin)
                    }
                },
            };
            mapping.insert(&name, value, scale);
        }
        mapping
    }
}
