//! Tests for the parameter table

use approx::assert_relative_eq;
use petab_rs::parameters::{ParameterRecord, ParameterTable, Prior, PriorKind, PriorUse, Scale};
use petab_rs::PetabError;
use std::collections::HashMap;

use crate::test_helpers::k1_k2_table;

#[test]
fn test_k1_k2_scenario() {
    let table = k1_k2_table();

    assert_eq!(table.ids(true, false), vec!["k1"]);
    assert_eq!(table.ids(false, true), vec!["k2"]);
    assert_eq!(table.free_indices(), vec![0]);
    assert_eq!(table.fixed_indices(), vec![1]);

    let ub = table.upper_bounds(true, true, true);
    assert_eq!(ub.len(), 2);
    assert_relative_eq!(ub[0], 10.0);
    assert_relative_eq!(ub[1], 5f64.log10());

    assert_eq!(table.nominal(true, true, false), vec![2.0, 1.0]);
    assert_eq!(table.nominal(true, true, true), vec![2.0, 0.0]);
    assert_eq!(table.lower_bounds(false, true, false), vec![0.0]);
    assert_eq!(table.lower_bounds(false, true, true), vec![f64::NEG_INFINITY]);
}

#[test]
fn test_free_fixed_partition() {
    let records = vec![
        ParameterRecord::new("a", 1.0, 0.0, 2.0, Scale::Lin, false).unwrap(),
        ParameterRecord::new("b", 1.0, 0.0, 2.0, Scale::Log, true).unwrap(),
        ParameterRecord::new("c", 1.0, 0.0, 2.0, Scale::Lin, true).unwrap(),
        ParameterRecord::new("d", 1.0, 0.0, 2.0, Scale::Log10, false).unwrap(),
        ParameterRecord::new("e", 1.0, 0.0, 2.0, Scale::Lin, true).unwrap(),
    ];
    let table = ParameterTable::new(records).unwrap();

    let mut all: Vec<usize> = table.free_indices().into_iter().chain(table.fixed_indices()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..table.len()).collect::<Vec<_>>());

    let free = table.ids(true, false);
    let fixed = table.ids(false, true);
    assert_eq!(free.len() + fixed.len(), table.len());
    assert!(free.iter().all(|id| !fixed.contains(id)));
    assert!(table.ids(false, false).is_empty());
    assert_eq!(table.scales(true, false), vec![Scale::Log, Scale::Lin, Scale::Lin]);
}

#[test]
fn test_invalid_rows() {
    assert!(ParameterRecord::new("k", 11.0, 0.0, 10.0, Scale::Lin, true).is_err());
    assert!(ParameterRecord::new("k", 1.0, 10.0, 0.0, Scale::Lin, true).is_err());

    let err = ParameterTable::new(vec![
        ParameterRecord::new("k", 1.0, 0.0, 10.0, Scale::Lin, true).unwrap(),
        ParameterRecord::new("k", 2.0, 0.0, 10.0, Scale::Lin, true).unwrap(),
    ])
    .unwrap_err();
    assert!(matches!(err, PetabError::DuplicateParameter(id) if id == "k"));
}

#[test]
fn test_scale_parameter_maps() {
    let table = ParameterTable::new(vec![
        ParameterRecord::new("k1", 10.0, 1.0, 100.0, Scale::Log10, true).unwrap(),
        ParameterRecord::new("k2", 1.0, 0.1, 10.0, Scale::Log, true).unwrap(),
    ])
    .unwrap();

    let linear: HashMap<String, f64> = [("k1".to_string(), 100.0), ("k2".to_string(), 1.0)].into();
    let scaled = table.scale_parameters(&linear).unwrap();
    assert_relative_eq!(scaled["k1"], 2.0);
    assert_relative_eq!(scaled["k2"], 0.0);

    let restored = table.unscale_parameters(&scaled).unwrap();
    assert_relative_eq!(restored["k1"], 100.0, max_relative = 1e-12);

    let unknown: HashMap<String, f64> = [("k3".to_string(), 1.0)].into();
    assert!(matches!(
        table.scale_parameters(&unknown),
        Err(PetabError::UnknownParameter(id)) if id == "k3"
    ));
}

#[test]
fn test_priors() {
    let table = ParameterTable::new(vec![
        ParameterRecord::new("k1", 1.0, 0.01, 100.0, Scale::Log10, true).unwrap(),
        ParameterRecord::new("k2", 1.0, 0.0, 5.0, Scale::Lin, false).unwrap(),
        ParameterRecord::new("k3", 1.0, 0.0, 5.0, Scale::Lin, true)
            .unwrap()
            .with_objective_prior(Prior::parse("k3", "normal", "1;0.5").unwrap()),
    ])
    .unwrap();

    let init = table.priors(PriorUse::Initialization);
    assert_eq!(init.len(), 2);
    assert_eq!(init[0].id, "k1");
    assert_eq!(init[0].kind, PriorKind::ParameterScaleUniform);
    assert_relative_eq!(init[0].parameters.0, -2.0);
    assert_relative_eq!(init[0].parameters.1, 2.0);
    assert_eq!(init[0].bounds.upper, 100.0);

    let objective = table.priors(PriorUse::Objective);
    assert_eq!(objective[1].kind, PriorKind::Normal);
    assert_eq!(objective[1].parameters, (1.0, 0.5));

    assert!(Prior::parse("k", "cauchy", "0;1").is_err());
    assert!(Prior::parse("k", "normal", "1").is_err());
    assert_eq!(Prior::parse("k", "", "").unwrap(), None);
}

#[test]
fn test_table_json() {
    let table = k1_k2_table();
    let json = serde_json::to_string(&table).unwrap();
    let restored: ParameterTable = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, table);
    assert!(restored.contains("k2"));

    let duplicated = format!("[{0},{0}]", serde_json::to_string(table.get("k1").unwrap()).unwrap());
    assert!(serde_json::from_str::<ParameterTable>(&duplicated).is_err());
}
