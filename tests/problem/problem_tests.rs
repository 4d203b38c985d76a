//! Tests for the problem snapshot

use approx::assert_relative_eq;
use petab_rs::conditions::ConditionTable;
use petab_rs::measurements::MeasurementTable;
use petab_rs::model::SimpleModel;
use petab_rs::observables::{NoiseDistribution, ObservableTable};
use petab_rs::parameters::{Bounds, Scale};
use petab_rs::{MappingConfig, ParameterValue, PetabError, Problem, SimulationCondition, FORMAT_VERSION};
use std::collections::HashMap;

use crate::test_helpers::*;

#[test]
fn test_format_version_checked() {
    assert_eq!(FORMAT_VERSION, "1");
    let err = Problem::new(
        "2",
        conversion_model(),
        conversion_conditions(),
        conversion_measurements(),
        conversion_parameters(),
        conversion_observables(),
    )
    .unwrap_err();
    assert!(matches!(err, PetabError::UnresolvedVersion { found, expected } if found == "2" && expected == "1"));
}

#[test]
fn test_parameter_vectors() {
    let problem = conversion_problem();
    assert_eq!(
        problem.x_ids(),
        vec!["k_forward", "k_reverse", "scaling_b", "offset_b", "sigma_a", "p1_c2"]
    );
    assert_eq!(problem.x_free_ids(), vec!["k_forward", "k_reverse", "scaling_b"]);
    assert_eq!(problem.x_fixed_ids(), vec!["offset_b", "sigma_a", "p1_c2"]);
    assert_eq!(problem.x_free_indices(), vec![0, 1, 2]);
    assert_eq!(problem.x_fixed_indices(), vec![3, 4, 5]);

    let lb = problem.lb(true, false, true);
    assert_relative_eq!(lb[0], -3.0, epsilon = 1e-12);
    assert_relative_eq!(lb[2], 1e-2f64.ln(), epsilon = 1e-12);
    let nominal = problem.x_nominal(false, true, false);
    assert_eq!(nominal, vec![0.0, 0.2, 4.0]);

    let scales = problem.optimization_parameter_scales();
    assert_eq!(scales.len(), 3);
    assert_eq!(scales["scaling_b"], Scale::Log);
}

#[test]
fn test_scale_and_unscale_through_problem() {
    let problem = conversion_problem();
    let values: HashMap<String, f64> = [("k_forward".to_string(), 10.0), ("offset_b".to_string(), -0.5)].into();
    let scaled = problem.scale_parameters(&values).unwrap();
    assert_relative_eq!(scaled["k_forward"], 1.0);
    assert_relative_eq!(scaled["offset_b"], -0.5);
    let restored = problem.unscale_parameters(&scaled).unwrap();
    assert_relative_eq!(restored["k_forward"], 10.0, max_relative = 1e-12);
}

#[test]
fn test_simulation_conditions_and_observables() {
    let problem = conversion_problem();
    assert_eq!(
        problem.simulation_conditions(),
        vec![
            SimulationCondition::new("c1", None),
            SimulationCondition::new("c2", Some("preeq"))
        ]
    );
    assert_eq!(problem.observable_ids(), vec!["obs_b", "obs_a"]);
    let noise = problem.noise_distributions();
    assert_eq!(noise["obs_a"], (Scale::Log10, NoiseDistribution::Normal));
}

#[test]
fn test_required_and_valid_parameter_ids() {
    let problem = conversion_problem();
    assert_eq!(
        problem.required_parameter_ids().unwrap(),
        vec!["scaling_b", "offset_b", "sigma_a", "p1_c2"]
    );
    // k_forward and p1 are condition table columns
    assert_eq!(
        problem.valid_parameter_ids().unwrap(),
        vec!["k_reverse", "sigma_a", "scaling_b", "offset_b", "p1_c2"]
    );
}

#[test]
fn test_create_parameter_table() {
    let problem = conversion_problem();
    let bounds = Bounds::new(1e-3, 1e3).unwrap();

    let required = problem.create_parameter_table(false, Scale::Log10, bounds).unwrap();
    assert_eq!(
        required.ids(true, true),
        vec!["scaling_b", "offset_b", "sigma_a", "p1_c2"]
    );
    assert_eq!(required.free_indices(), vec![0, 1, 2, 3]);
    let scaling_b = required.get("scaling_b").unwrap();
    assert_eq!(scaling_b.name(), Some("scaling_b"));
    assert_eq!(scaling_b.scale(), Scale::Log10);
    assert_relative_eq!(scaling_b.nominal_value(), 1.0);

    let valid = problem.create_parameter_table(true, Scale::Lin, bounds).unwrap();
    assert_eq!(
        valid.ids(true, true),
        vec!["k_reverse", "sigma_a", "scaling_b", "offset_b", "p1_c2"]
    );
    // model default of k_reverse
    assert_relative_eq!(valid.get("k_reverse").unwrap().nominal_value(), 0.1);

    // defaults outside the bounds are clamped
    let narrow = problem
        .create_parameter_table(true, Scale::Log, Bounds::new(0.5, 10.0).unwrap())
        .unwrap();
    assert_relative_eq!(narrow.get("k_reverse").unwrap().nominal_value(), 0.5);
    assert_relative_eq!(narrow.get("p1_c2").unwrap().nominal_value(), 1.0);
}

#[test]
fn test_parameter_mapping_via_problem() {
    let problem = conversion_problem();
    let result = problem.parameter_mapping(MappingConfig::default()).unwrap();
    assert_eq!(result.mappings.len(), 2);
    assert_eq!(
        result.mappings[0].simulation.get("p1"),
        Some(&ParameterValue::Numeric(3.0))
    );
}

#[test]
fn test_problem_json_round_trip() {
    let problem = conversion_problem();
    let json = problem.to_json().unwrap();
    let restored: Problem<SimpleModel> = Problem::from_json(&json).unwrap();
    assert_eq!(restored, problem);
    assert_eq!(
        restored.parameter_mapping(MappingConfig::default()).unwrap(),
        problem.parameter_mapping(MappingConfig::default()).unwrap()
    );

    let tables: (ConditionTable, MeasurementTable, ObservableTable) = (
        serde_json::from_str(&serde_json::to_string(problem.conditions()).unwrap()).unwrap(),
        serde_json::from_str(&serde_json::to_string(problem.measurements()).unwrap()).unwrap(),
        serde_json::from_str(&serde_json::to_string(problem.observables()).unwrap()).unwrap(),
    );
    assert_eq!(&tables.0, problem.conditions());
    assert_eq!(&tables.1, problem.measurements());
    assert_eq!(&tables.2, problem.observables());
}
