//! The PEtab problem
//!
//! [`Problem`] owns a model and the four tables of a parameter estimation
//! problem. It is an immutable snapshot: every derived quantity (parameter
//! vectors, bounds, simulation conditions, parameter mappings) is computed on
//! demand from the tables.

use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditions::ConditionTable;
use crate::error::{PetabError, Result};
use crate::mapping::{MappingConfig, MappingResult, ParameterMappingEngine};
use crate::measurements::{MeasurementTable, SimulationCondition};
use crate::model::Model;
use crate::observables::{NoiseDistribution, ObservableResolver, ObservableTable};
use crate::parameters::{Bounds, ParameterRecord, ParameterTable, PriorInfo, PriorUse, Scale};
use crate::sampling;

/// Supported PEtab format version
pub const FORMAT_VERSION: &str = "1";

/// Fail unless `version` is the supported format version.
pub fn check_format_version(version: &str) -> Result<()> {
    if version.trim() == FORMAT_VERSION {
        Ok(())
    } else {
        Err(PetabError::UnresolvedVersion {
            found: version.to_string(),
            expected: FORMAT_VERSION.to_string(),
        })
    }
}

/// A validated PEtab problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem<M: Model> {
    format_version: String,
    model: M,
    conditions: ConditionTable,
    measurements: MeasurementTable,
    parameters: ParameterTable,
    observables: ObservableTable,
}

/// Insertion-ordered set of ids
#[derive(Default)]
struct IdSet {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl IdSet {
    fn insert(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
    }
}

impl<M: Model> Problem<M> {
    /// Assemble a problem from its parts after checking the declared format
    /// version.
    pub fn new(
        format_version: &str,
        model: M,
        conditions: ConditionTable,
        measurements: MeasurementTable,
        parameters: ParameterTable,
        observables: ObservableTable,
    ) -> Result<Self> {
        check_format_version(format_version)?;
        debug!(
            parameters = parameters.len(),
            conditions = conditions.len(),
            observables = observables.len(),
            measurements = measurements.len(),
            "creating PEtab problem"
        );
        Ok(Self {
            format_version: format_version.trim().to_string(),
            model,
            conditions,
            measurements,
            parameters,
            observables,
        })
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn conditions(&self) -> &ConditionTable {
        &self.conditions
    }

    pub fn measurements(&self) -> &MeasurementTable {
        &self.measurements
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn observables(&self) -> &ObservableTable {
        &self.observables
    }

    /// All parameter table ids
    pub fn x_ids(&self) -> Vec<String> {
        self.parameters.ids(true, true)
    }

    /// Ids of estimated parameters
    pub fn x_free_ids(&self) -> Vec<String> {
        self.parameters.ids(true, false)
    }

    /// Ids of fixed parameters
    pub fn x_fixed_ids(&self) -> Vec<String> {
        self.parameters.ids(false, true)
    }

    pub fn x_free_indices(&self) -> Vec<usize> {
        self.parameters.free_indices()
    }

    pub fn x_fixed_indices(&self) -> Vec<usize> {
        self.parameters.fixed_indices()
    }

    /// Nominal values, filtered by estimation status and optionally scaled
    pub fn x_nominal(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.parameters.nominal(free, fixed, scaled)
    }

    pub fn lb(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.parameters.lower_bounds(free, fixed, scaled)
    }

    pub fn ub(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.parameters.upper_bounds(free, fixed, scaled)
    }

    pub fn optimization_parameter_ids(&self) -> Vec<String> {
        self.parameters.optimization_parameter_ids()
    }

    pub fn optimization_parameter_scales(&self) -> HashMap<String, Scale> {
        self.parameters.optimization_parameter_scales()
    }

    pub fn model_parameters(&self) -> Vec<(String, f64)> {
        self.model.parameters()
    }

    pub fn observable_ids(&self) -> Vec<&str> {
        self.observables.ids()
    }

    /// Observable transformation and noise distribution by observable id
    pub fn noise_distributions(&self) -> HashMap<String, (Scale, NoiseDistribution)> {
        self.observables
            .iter()
            .map(|o| (o.id.clone(), (o.transformation, o.noise_distribution)))
            .collect()
    }

    pub fn priors(&self, usage: PriorUse) -> Vec<PriorInfo> {
        self.parameters.priors(usage)
    }

    pub fn simulation_conditions(&self) -> Vec<SimulationCondition> {
        self.measurements.simulation_conditions()
    }

    /// Optimization-to-simulation parameter mapping for every simulation
    /// condition
    pub fn parameter_mapping(&self, config: MappingConfig) -> Result<MappingResult> {
        ParameterMappingEngine::new(config).compute(
            &self.conditions,
            &self.measurements,
            &self.parameters,
            &self.observables,
            &self.model,
        )
    }

    /// Map parameter id -> linear value onto the table scales
    pub fn scale_parameters(&self, values: &HashMap<String, f64>) -> Result<HashMap<String, f64>> {
        self.parameters.scale_parameters(values)
    }

    /// Map parameter id -> scaled value back to linear scale
    pub fn unscale_parameters(&self, values: &HashMap<String, f64>) -> Result<HashMap<String, f64>> {
        self.parameters.unscale_parameters(values)
    }

    /// Startpoints for multi-start optimization, see
    /// [`sampling::sample_parameter_startpoints`]
    pub fn sample_parameter_startpoints<R: Rng + ?Sized>(
        &self,
        n_starts: usize,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        sampling::sample_parameter_startpoints(&self.parameters, n_starts, rng)
    }

    /// Ids that must appear in the parameter table: symbolic measurement
    /// overrides not shadowed by condition columns, output parameters that
    /// are neither placeholders nor model parameters, and parametric
    /// condition overrides not defined by the model.
    pub fn required_parameter_ids(&self) -> Result<Vec<String>> {
        let mut required = IdSet::default();
        let condition_targets: HashSet<String> = self.conditions.targets().into_iter().collect();

        for id in self.measurements.parameter_ids() {
            if !condition_targets.contains(&id) {
                required.insert(&id);
            }
        }

        let resolver = ObservableResolver::new(&self.observables);
        for (observables, noise) in [(true, false), (false, true)] {
            let placeholders: HashSet<String> =
                resolver.all_placeholders(observables, noise)?.into_iter().collect();
            for id in resolver.output_parameters(&self.model, observables, noise)? {
                if !placeholders.contains(&id) && !self.model.has_parameter(&id) {
                    required.insert(&id);
                }
            }
        }

        for id in self.conditions.parametric_overrides() {
            if !self.model.has_parameter(&id) {
                required.insert(&id);
            }
        }

        Ok(required.ids)
    }

    /// Ids allowed in the parameter table: model parameters (except
    /// placeholders, assignment rule targets and condition columns), output
    /// parameters, symbolic measurement overrides and parametric condition
    /// overrides.
    pub fn valid_parameter_ids(&self) -> Result<Vec<String>> {
        let resolver = ObservableResolver::new(&self.observables);
        let mut excluded: HashSet<String> = resolver.all_placeholders(true, true)?.into_iter().collect();
        excluded.extend(self.model.assignment_rule_targets());
        excluded.extend(self.conditions.targets());

        let mut valid = IdSet::default();
        for (id, _) in self.model.parameters() {
            if !excluded.contains(&id) {
                valid.insert(&id);
            }
        }
        for id in resolver.output_parameters(&self.model, true, true)? {
            if !excluded.contains(&id) {
                valid.insert(&id);
            }
        }
        for id in self.measurements.parameter_ids() {
            if !excluded.contains(&id) {
                valid.insert(&id);
            }
        }
        for id in self.conditions.parametric_overrides() {
            valid.insert(&id);
        }

        Ok(valid.ids)
    }

    /// Build a fresh parameter table for this problem.
    ///
    /// Rows are the [required](Problem::required_parameter_ids) ids, or the
    /// [valid](Problem::valid_parameter_ids) ids with `include_optional`. Every
    /// row is estimated on `scale` within `bounds` and named after its id.
    /// Nominal values are the model defaults, `1.0` for ids the model does not
    /// define, clamped into `bounds`.
    pub fn create_parameter_table(
        &self,
        include_optional: bool,
        scale: Scale,
        bounds: Bounds,
    ) -> Result<ParameterTable> {
        let ids = if include_optional {
            self.valid_parameter_ids()?
        } else {
            self.required_parameter_ids()?
        };

        let records = ids
            .iter()
            .map(|id| -> Result<ParameterRecord> {
                let nominal = bounds.clamp(self.model.parameter_value(id).unwrap_or(1.0));
                Ok(ParameterRecord::new(id, nominal, bounds.lower, bounds.upper, scale, true)?.with_name(id))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(parameters = records.len(), include_optional, "created parameter table");
        ParameterTable::new(records)
    }

    /// Serialize the problem to JSON
    pub fn to_json(&self) -> Result<String>
    where
        M: Serialize,
    {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a problem serialized with [`Problem::to_json`]
    pub fn from_json(json: &str) -> Result<Self>
    where
        M: DeserializeOwned,
    {
        let problem: Self = serde_json::from_str(json)?;
        check_format_version(&problem.format_version)?;
        Ok(problem)
    }
}
