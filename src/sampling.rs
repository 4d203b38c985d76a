//! Startpoint sampling for multi-start optimization
//!
//! Startpoints are drawn from the initialization prior of every estimated
//! parameter and returned on the parameters' estimation scales, clipped to the
//! scaled bounds.

use ndarray::Array2;
use rand::distributions::Open01;
use rand::prelude::*;
use rand_distr::{Distribution, Normal, Uniform};

use crate::error::{PetabError, Result};
use crate::parameters::{ParameterTable, PriorInfo, PriorKind, PriorUse};

/// Sample `n_starts` startpoints for the free parameters of `table`.
///
/// Returns a matrix of shape `(n_starts, n_free)` whose columns follow the
/// order of the free parameters in the table.
///
/// # Examples
///
/// ```
/// use petab_rs::parameters::{ParameterRecord, ParameterTable, Scale};
/// use petab_rs::sampling::sample_parameter_startpoints;
/// use rand::SeedableRng;
///
/// let table = ParameterTable::new(vec![
///     ParameterRecord::new("k1", 1.0, 0.01, 100.0, Scale::Log10, true).unwrap(),
///     ParameterRecord::new("k2", 1.0, 0.0, 5.0, Scale::Lin, false).unwrap(),
/// ])
/// .unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let starts = sample_parameter_startpoints(&table, 10, &mut rng).unwrap();
/// assert_eq!(starts.dim(), (10, 1));
/// assert!(starts.iter().all(|x| (-2.0..=2.0).contains(x)));
/// ```
pub fn sample_parameter_startpoints<R: Rng + ?Sized>(
    table: &ParameterTable,
    n_starts: usize,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let priors = table.priors(PriorUse::Initialization);
    let mut starts = Array2::zeros((n_starts, priors.len()));

    for (j, prior) in priors.iter().enumerate() {
        let scaled_bounds = prior.bounds.scaled(prior.scale);
        for i in 0..n_starts {
            let value = sample_prior(prior, rng)?;
            starts[[i, j]] = scaled_bounds.clamp(value);
        }
    }

    Ok(starts)
}

/// Draw one value from a prior, returned on the parameter's scale
fn sample_prior<R: Rng + ?Sized>(prior: &PriorInfo, rng: &mut R) -> Result<f64> {
    let (a, b) = prior.parameters;
    let value = match prior.kind {
        PriorKind::Uniform => prior.scale.scale(uniform(prior, a, b, rng)?),
        PriorKind::Normal => prior.scale.scale(normal(prior, a, b, rng)?),
        PriorKind::Laplace => prior.scale.scale(laplace(prior, a, b, rng)?),
        PriorKind::LogNormal => prior.scale.scale(normal(prior, a, b, rng)?.exp()),
        PriorKind::LogLaplace => prior.scale.scale(laplace(prior, a, b, rng)?.exp()),
        PriorKind::ParameterScaleUniform => uniform(prior, a, b, rng)?,
        PriorKind::ParameterScaleNormal => normal(prior, a, b, rng)?,
        PriorKind::ParameterScaleLaplace => laplace(prior, a, b, rng)?,
    };
    Ok(value)
}

fn invalid(prior: &PriorInfo, message: String) -> PetabError {
    PetabError::InvalidPrior {
        id: prior.id.clone(),
        message,
    }
}

fn uniform<R: Rng + ?Sized>(prior: &PriorInfo, lower: f64, upper: f64, rng: &mut R) -> Result<f64> {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(invalid(
            prior,
            format!("cannot sample uniformly from [{}, {}]", lower, upper),
        ));
    }
    if lower == upper {
        return Ok(lower);
    }
    Ok(Uniform::new(lower, upper).sample(rng))
}

fn normal<R: Rng + ?Sized>(prior: &PriorInfo, mean: f64, std_dev: f64, rng: &mut R) -> Result<f64> {
    let distribution = Normal::new(mean, std_dev).map_err(|e| invalid(prior, e.to_string()))?;
    Ok(distribution.sample(rng))
}

/// Laplace sample by inverting the CDF
fn laplace<R: Rng + ?Sized>(prior: &PriorInfo, location: f64, scale: f64, rng: &mut R) -> Result<f64> {
    if !(scale > 0.0) || !location.is_finite() {
        return Err(invalid(
            prior,
            format!("invalid laplace parameters ({}, {})", location, scale),
        ));
    }
    // open interval keeps 1 - 2|u| away from zero
    let open: f64 = Open01.sample(rng);
    let u = open - 0.5;
    Ok(location - scale * u.signum() * (1.0 - 2.0 * u.abs()).ln())
}
