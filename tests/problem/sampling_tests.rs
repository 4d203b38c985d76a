//! Tests for startpoint sampling

use petab_rs::parameters::{ParameterRecord, ParameterTable, Prior, PriorKind, Scale};
use petab_rs::sampling::sample_parameter_startpoints;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::*;

#[test]
fn test_problem_startpoints_within_scaled_bounds() {
    let problem = conversion_problem();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let starts = problem.sample_parameter_startpoints(100, &mut rng).unwrap();
    assert_eq!(starts.dim(), (100, problem.x_free_ids().len()));

    let lb = problem.lb(true, false, true);
    let ub = problem.ub(true, false, true);
    for row in starts.rows() {
        for (j, &x) in row.iter().enumerate() {
            assert!(x >= lb[j] && x <= ub[j], "start {x} outside [{}, {}]", lb[j], ub[j]);
        }
    }
}

#[test]
fn test_log_normal_prior_sampled_on_linear_scale() {
    let table = ParameterTable::new(vec![ParameterRecord::new("k", 1.0, 1e-3, 1e3, Scale::Log10, true)
        .unwrap()
        .with_initialization_prior(Some(Prior {
            kind: PriorKind::LogNormal,
            parameters: (0.0, 0.1),
        }))])
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let starts = sample_parameter_startpoints(&table, 500, &mut rng).unwrap();
    // exp(N(0, 0.1)) stays close to 1, i.e. close to 0 on log10 scale
    assert!(starts.iter().all(|x| x.abs() < 0.3));
}

#[test]
fn test_no_free_parameters() {
    let table = k1_k2_table();
    let fixed_only = ParameterTable::new(
        table
            .iter()
            .filter(|r| !r.estimate())
            .cloned()
            .collect(),
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let starts = sample_parameter_startpoints(&fixed_only, 3, &mut rng).unwrap();
    assert_eq!(starts.dim(), (3, 0));
}
