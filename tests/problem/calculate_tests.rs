//! Tests for residuals and likelihoods

use approx::assert_relative_eq;
use petab_rs::calculate::{calculate_chi2, calculate_llh, calculate_residuals, calculate_single_llh};
use petab_rs::observables::NoiseDistribution;
use petab_rs::parameters::Scale;
use std::f64::consts::{LN_10, PI};

use crate::test_helpers::*;

#[test]
fn test_perfect_fit() {
    let problem = conversion_problem();
    let simulations: Vec<f64> = problem.measurements().iter().map(|row| row.measurement).collect();

    let residuals = calculate_residuals(
        problem.measurements(),
        &simulations,
        problem.observables(),
        problem.parameters(),
        true,
        true,
    )
    .unwrap();
    assert!(residuals.iter().all(|&r| r == 0.0));

    let chi2 = calculate_chi2(
        problem.measurements(),
        &simulations,
        problem.observables(),
        problem.parameters(),
        true,
        true,
    )
    .unwrap();
    assert_eq!(chi2, 0.0);

    // obs_b: normal on lin scale with sigma 0.1
    // obs_a: normal on log10 scale with sigma_a = 0.2
    let expected: f64 = problem
        .measurements()
        .iter()
        .map(|row| {
            if row.observable_id == "obs_b" {
                -0.5 * (2.0 * PI * 0.01).ln()
            } else {
                -0.5 * (2.0 * PI * 0.04 * row.measurement.powi(2) * LN_10.powi(2)).ln()
            }
        })
        .sum();
    let llh = calculate_llh(
        problem.measurements(),
        &simulations,
        problem.observables(),
        problem.parameters(),
    )
    .unwrap();
    assert_relative_eq!(llh, expected, epsilon = 1e-10);
}

#[test]
fn test_single_llh_cases() {
    let sigma: f64 = 0.5;
    let (m, s): (f64, f64) = (2.0, 3.0);

    let llh = calculate_single_llh(m, s, Scale::Lin, NoiseDistribution::Normal, sigma);
    assert_relative_eq!(llh, -(0.5 * (2.0 * PI * sigma * sigma).ln() + 2.0));

    let llh = calculate_single_llh(m, s, Scale::Log, NoiseDistribution::Laplace, sigma);
    assert_relative_eq!(
        llh,
        -((2.0 * sigma * m).ln() + ((s.ln() - m.ln()) / sigma).abs()),
        epsilon = 1e-12
    );

    let better = calculate_single_llh(m, m, Scale::Lin, NoiseDistribution::Laplace, sigma);
    let worse = calculate_single_llh(m, s, Scale::Lin, NoiseDistribution::Laplace, sigma);
    assert!(better > worse);
}
