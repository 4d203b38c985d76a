//! Residuals, chi2 and log-likelihood of simulations against measurements
//!
//! Simulated values are passed as a slice aligned with the rows of the
//! measurement table. Noise formulas are evaluated per row with the noise
//! parameter overrides of that row, the parameter table's nominal values and
//! the (transformed) simulation bound to the observable id.

use std::collections::HashMap;
use std::f64::consts::{LN_10, PI};

use crate::error::{PetabError, Result};
use crate::measurements::{MeasurementRecord, MeasurementTable};
use crate::observables::{parse_formula, NoiseDistribution, ObservableRecord, ObservableTable, PlaceholderKind};
use crate::parameters::{Expression, ParameterTable, Scale};
use crate::value::ParameterValue;

/// Parsed noise formulas by observable id. Observables with an empty noise
/// formula have no entry.
pub fn noise_formulas(observables: &ObservableTable) -> Result<HashMap<String, Expression>> {
    let mut formulas = HashMap::new();
    for record in observables.iter() {
        if let Some(formula) = parse_formula(&record.noise_formula)? {
            formulas.insert(record.id.clone(), formula);
        }
    }
    Ok(formulas)
}

/// Evaluate the noise formula of `observable` for one measurement row.
///
/// `simulation` is bound to the observable id and should already be on the
/// observable's transformation scale. A missing formula is an
/// [`PetabError::Evaluation`] error.
pub fn evaluate_noise_formula(
    measurement: &MeasurementRecord,
    observable: &ObservableRecord,
    formula: Option<&Expression>,
    parameters: &ParameterTable,
    simulation: f64,
) -> Result<f64> {
    let formula = formula.ok_or_else(|| {
        PetabError::Evaluation(format!("observable '{}' has no noise formula", observable.id))
    })?;
    let nominal = |id: &str| {
        parameters
            .get(id)
            .map(|record| record.nominal_value())
            .ok_or_else(|| PetabError::UnknownParameter(id.to_string()))
    };

    let mut context: HashMap<String, f64> = parameters
        .iter()
        .map(|record| (record.id().to_string(), record.nominal_value()))
        .collect();
    for (i, value) in measurement.noise_parameters.iter().enumerate() {
        let value = match value {
            ParameterValue::Numeric(v) => *v,
            ParameterValue::Parameter(id) => nominal(id)?,
        };
        context.insert(PlaceholderKind::Noise.placeholder(i + 1, &observable.id), value);
    }
    context.insert(observable.id.clone(), simulation);

    formula.evaluate(&context).map_err(|e| {
        PetabError::Evaluation(format!(
            "cannot evaluate noise formula '{}' of observable '{}': {}",
            observable.noise_formula, observable.id, e
        ))
    })
}

fn check_lengths(measurements: &MeasurementTable, simulations: &[f64]) -> Result<()> {
    if measurements.len() != simulations.len() {
        return Err(PetabError::ShapeMismatch {
            expected: measurements.len(),
            found: simulations.len(),
        });
    }
    Ok(())
}

/// Residual `simulation - measurement` for every row.
///
/// With `scale` both values are first transformed by the observable's
/// transformation; with `normalize` the residual is divided by the evaluated
/// noise formula.
pub fn calculate_residuals(
    measurements: &MeasurementTable,
    simulations: &[f64],
    observables: &ObservableTable,
    parameters: &ParameterTable,
    normalize: bool,
    scale: bool,
) -> Result<Vec<f64>> {
    check_lengths(measurements, simulations)?;
    let formulas = if normalize {
        noise_formulas(observables)?
    } else {
        HashMap::new()
    };

    measurements
        .iter()
        .zip(simulations)
        .map(|(row, &simulation)| -> Result<f64> {
            let observable = observables
                .get(&row.observable_id)
                .ok_or_else(|| PetabError::UnknownObservable(row.observable_id.clone()))?;
            let (mut simulation, mut measurement) = (simulation, row.measurement);
            if scale {
                simulation = observable.transformation.scale(simulation);
                measurement = observable.transformation.scale(measurement);
            }

            let mut residual = simulation - measurement;
            if normalize {
                let formula = formulas.get(&observable.id);
                residual /= evaluate_noise_formula(row, observable, formula, parameters, simulation)?;
            }
            Ok(residual)
        })
        .collect()
}

/// Sum of squared residuals
pub fn calculate_chi2(
    measurements: &MeasurementTable,
    simulations: &[f64],
    observables: &ObservableTable,
    parameters: &ParameterTable,
    normalize: bool,
    scale: bool,
) -> Result<f64> {
    let residuals = calculate_residuals(measurements, simulations, observables, parameters, normalize, scale)?;
    Ok(residuals.iter().map(|r| r * r).sum())
}

/// Total log-likelihood of the simulations
pub fn calculate_llh(
    measurements: &MeasurementTable,
    simulations: &[f64],
    observables: &ObservableTable,
    parameters: &ParameterTable,
) -> Result<f64> {
    check_lengths(measurements, simulations)?;
    let formulas = noise_formulas(observables)?;

    let mut llh = 0.0;
    for (row, &simulation) in measurements.iter().zip(simulations) {
        let observable = observables
            .get(&row.observable_id)
            .ok_or_else(|| PetabError::UnknownObservable(row.observable_id.clone()))?;
        let scaled = observable.transformation.scale(simulation);
        let sigma = evaluate_noise_formula(row, observable, formulas.get(&observable.id), parameters, scaled)?;
        llh += calculate_single_llh(
            row.measurement,
            simulation,
            observable.transformation,
            observable.noise_distribution,
            sigma,
        );
    }
    Ok(llh)
}

/// Log-likelihood of a single measurement `m` given simulation `s` and noise
/// parameter `sigma` (standard deviation for normal, scale for laplace noise).
pub fn calculate_single_llh(
    measurement: f64,
    simulation: f64,
    scale: Scale,
    noise_distribution: NoiseDistribution,
    sigma: f64,
) -> f64 {
    let (m, s) = (measurement, simulation);
    let nllh = match (noise_distribution, scale) {
        (NoiseDistribution::Normal, Scale::Lin) => {
            0.5 * (2.0 * PI * sigma.powi(2)).ln() + 0.5 * ((s - m) / sigma).powi(2)
        }
        (NoiseDistribution::Normal, Scale::Log) => {
            0.5 * (2.0 * PI * sigma.powi(2) * m.powi(2)).ln() + 0.5 * ((s.ln() - m.ln()) / sigma).powi(2)
        }
        (NoiseDistribution::Normal, Scale::Log10) => {
            0.5 * (2.0 * PI * sigma.powi(2) * m.powi(2) * LN_10.powi(2)).ln()
                + 0.5 * ((s.log10() - m.log10()) / sigma).powi(2)
        }
        (NoiseDistribution::Laplace, Scale::Lin) => (2.0 * sigma).ln() + ((s - m) / sigma).abs(),
        (NoiseDistribution::Laplace, Scale::Log) => (2.0 * sigma * m).ln() + ((s.ln() - m.ln()) / sigma).abs(),
        (NoiseDistribution::Laplace, Scale::Log10) => {
            (2.0 * sigma * m * LN_10).ln() + ((s.log10() - m.log10()) / sigma).abs()
        }
    };
    -nllh
}
