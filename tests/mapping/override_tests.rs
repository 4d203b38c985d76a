//! Tests for measurement override resolution

use petab_rs::mapping::{MappingConfig, ParameterMappingEngine};
use petab_rs::measurements::{MeasurementOverrideResolver, MeasurementRecord, MeasurementTable, PlaceholderValue};
use petab_rs::{ParameterValue, PetabError};

use crate::test_helpers::*;

fn noise_series(values: &[&str]) -> MeasurementTable {
    MeasurementTable::new(
        values
            .iter()
            .enumerate()
            .map(|(i, noise)| {
                MeasurementRecord::new("obs_b", "c1", i as f64, 1.0)
                    .with_observable_parameters(ParameterValue::parse_list("scaling_b;offset_b").unwrap())
                    .with_noise_parameters(ParameterValue::parse_list(noise).unwrap())
            })
            .collect(),
    )
}

fn map(measurements: &MeasurementTable, allow: bool) -> petab_rs::Result<petab_rs::MappingResult> {
    ParameterMappingEngine::new(MappingConfig::new().with_timepoint_specific_numeric_noise_parameters(allow))
        .compute(
            &conversion_conditions(),
            measurements,
            &conversion_parameters(),
            &conversion_observables(),
            &conversion_model(),
        )
}

#[test]
fn test_timepoint_specific_noise_rejected_by_default() {
    let measurements = noise_series(&["0.1", "0.2"]);
    match map(&measurements, false) {
        Err(PetabError::TimepointSpecificNumericOverride {
            condition,
            observable_id,
            kind,
        }) => {
            assert_eq!(condition, "c1");
            assert_eq!(observable_id, "obs_b");
            assert_eq!(kind, "noise");
        }
        other => panic!("Expected TimepointSpecificNumericOverride, got {other:?}"),
    }
}

#[test]
fn test_timepoint_specific_noise_allowed() {
    let measurements = noise_series(&["0.1", "0.2"]);
    let result = map(&measurements, true).unwrap();
    let mapping = &result.mappings[0].simulation;

    // left symbolic; the values are taken per row from the measurement table
    assert_eq!(
        mapping.get("noiseParameter1_obs_b"),
        Some(&ParameterValue::from("noiseParameter1_obs_b"))
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn test_timepoint_specific_symbolic_noise_always_rejected() {
    let measurements = noise_series(&["sigma_a", "0.2"]);
    assert!(matches!(
        map(&measurements, true),
        Err(PetabError::TimepointSpecificNumericOverride { .. })
    ));
}

#[test]
fn test_constant_overrides_are_condition_level() {
    let measurements = noise_series(&["0.1", "0.1", "0.1"]);
    let observables = conversion_observables();
    let groups = MeasurementOverrideResolver::new(&measurements, &observables, false)
        .resolve()
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].placeholders,
        vec![
            (
                "observableParameter1_obs_b".to_string(),
                PlaceholderValue::Override(ParameterValue::from("scaling_b"))
            ),
            (
                "observableParameter2_obs_b".to_string(),
                PlaceholderValue::Override(ParameterValue::from("offset_b"))
            ),
            (
                "noiseParameter1_obs_b".to_string(),
                PlaceholderValue::Override(ParameterValue::Numeric(0.1))
            ),
        ]
    );
}

#[test]
fn test_groups_split_by_preequilibration() {
    let measurements = MeasurementTable::new(vec![
        measurement("obs_b", "c2", 0.0, 1.0),
        measurement("obs_b", "c2", 0.0, 1.0).with_preequilibration("preeq"),
        measurement("obs_a", "c2", 0.0, 1.0),
    ]);
    let observables = conversion_observables();
    let resolver = MeasurementOverrideResolver::new(&measurements, &observables, false);
    let groups = resolver.groups();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].0, groups[2].0);
    assert_ne!(groups[0].0, groups[1].0);
}

#[test]
fn test_wrong_override_count() {
    let measurements = MeasurementTable::new(vec![MeasurementRecord::new("obs_b", "c1", 0.0, 1.0)
        .with_observable_parameters(ParameterValue::parse_list("scaling_b").unwrap())]);
    assert!(matches!(
        map(&measurements, false),
        Err(PetabError::InvalidPlaceholder { observable_id, .. }) if observable_id == "obs_b"
    ));
}
