//! Parameter table rows
//!
//! A [`ParameterRecord`] is one row of the PEtab parameter table: the id of an
//! optimization parameter, its nominal value, bounds, estimation scale and
//! whether it is estimated. Records are validated on construction and never
//! mutated afterwards.

use crate::error::PetabError;
use crate::parameters::bounds::{Bounds, BoundsError};
use crate::parameters::scale::Scale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when constructing parameter records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{id}': {source}")]
    Bounds {
        id: String,
        #[source]
        source: BoundsError,
    },

    #[error("Parameter '{id}': unknown prior type '{kind}'")]
    UnknownPrior { id: String, kind: String },

    #[error("Parameter '{id}': invalid prior parameters '{parameters}'")]
    InvalidPriorParameters { id: String, parameters: String },
}

impl From<ParameterError> for PetabError {
    fn from(err: ParameterError) -> Self {
        match err {
            ParameterError::Bounds { id, source } => PetabError::InvalidBounds {
                id,
                message: source.to_string(),
            },
            ParameterError::UnknownPrior { ref id, .. }
            | ParameterError::InvalidPriorParameters { ref id, .. } => PetabError::InvalidPrior {
                id: id.clone(),
                message: err.to_string(),
            },
        }
    }
}

/// Prior distribution types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorKind {
    Uniform,
    Normal,
    Laplace,
    LogNormal,
    LogLaplace,
    ParameterScaleUniform,
    ParameterScaleNormal,
    ParameterScaleLaplace,
}

impl PriorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorKind::Uniform => "uniform",
            PriorKind::Normal => "normal",
            PriorKind::Laplace => "laplace",
            PriorKind::LogNormal => "logNormal",
            PriorKind::LogLaplace => "logLaplace",
            PriorKind::ParameterScaleUniform => "parameterScaleUniform",
            PriorKind::ParameterScaleNormal => "parameterScaleNormal",
            PriorKind::ParameterScaleLaplace => "parameterScaleLaplace",
        }
    }

    /// Whether the prior is defined on the parameter's estimation scale
    /// rather than on linear scale
    pub fn on_parameter_scale(&self) -> bool {
        matches!(
            self,
            PriorKind::ParameterScaleUniform
                | PriorKind::ParameterScaleNormal
                | PriorKind::ParameterScaleLaplace
        )
    }
}

impl fmt::Display for PriorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(PriorKind::Uniform),
            "normal" => Ok(PriorKind::Normal),
            "laplace" => Ok(PriorKind::Laplace),
            "logNormal" => Ok(PriorKind::LogNormal),
            "logLaplace" => Ok(PriorKind::LogLaplace),
            "parameterScaleUniform" => Ok(PriorKind::ParameterScaleUniform),
            "parameterScaleNormal" => Ok(PriorKind::ParameterScaleNormal),
            "parameterScaleLaplace" => Ok(PriorKind::ParameterScaleLaplace),
            other => Err(other.to_string()),
        }
    }
}

/// Which of the two prior columns to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorUse {
    /// Distribution for sampling optimizer startpoints
    Initialization,
    /// Distribution entering the objective function
    Objective,
}

/// A prior distribution with its two parameters (e.g. mean and standard
/// deviation, or lower and upper bound)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    pub kind: PriorKind,
    pub parameters: (f64, f64),
}

impl Prior {
    /// Parse the prior type and `;`-separated prior parameter cells of a
    /// parameter table row.
    ///
    /// Returns `None` for the default prior, i.e. an empty type (or
    /// `parameterScaleUniform`) without explicit parameters. That prior is
    /// resolved against the row's scaled bounds by
    /// [`ParameterRecord::prior`].
    pub fn parse(id: &str, kind: &str, parameters: &str) -> Result<Option<Prior>, ParameterError> {
        let kind = kind.trim();
        let parameters = parameters.trim();
        let kind = if kind.is_empty() {
            PriorKind::ParameterScaleUniform
        } else {
            kind.parse::<PriorKind>()
                .map_err(|kind| ParameterError::UnknownPrior {
                    id: id.to_string(),
                    kind,
                })?
        };

        if parameters.is_empty() {
            if kind == PriorKind::ParameterScaleUniform {
                return Ok(None);
            }
            return Err(ParameterError::InvalidPriorParameters {
                id: id.to_string(),
                parameters: parameters.to_string(),
            });
        }

        let values = parameters
            .split(';')
            .map(|token| token.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>();
        match values.as_deref() {
            Ok([a, b]) => Ok(Some(Prior {
                kind,
                parameters: (*a, *b),
            })),
            _ => Err(ParameterError::InvalidPriorParameters {
                id: id.to_string(),
                parameters: parameters.to_string(),
            }),
        }
    }
}

/// One row of the parameter table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    id: String,
    name: Option<String>,
    nominal_value: f64,
    bounds: Bounds,
    scale: Scale,
    estimate: bool,
    initialization_prior: Option<Prior>,
    objective_prior: Option<Prior>,
}

impl<'de> Deserialize<'de> for ParameterRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RecordHelper {
            id: String,
            #[serde(default)]
            name: Option<String>,
            nominal_value: f64,
            #[serde(default)]
            bounds: Bounds,
            #[serde(default)]
            scale: Scale,
            estimate: bool,
            #[serde(default)]
            initialization_prior: Option<Prior>,
            #[serde(default)]
            objective_prior: Option<Prior>,
        }

        // Rows go through `new` so the nominal value is checked against the bounds
        let helper = RecordHelper::deserialize(deserializer)?;
        let record = ParameterRecord::new(
            &helper.id,
            helper.nominal_value,
            helper.bounds.lower,
            helper.bounds.upper,
            helper.scale,
            helper.estimate,
        )
        .map_err(serde::de::Error::custom)?
        .with_initialization_prior(helper.initialization_prior)
        .with_objective_prior(helper.objective_prior);
        Ok(ParameterRecord {
            name: helper.name,
            ..record
        })
    }
}

impl ParameterRecord {
    /// Create a parameter table row.
    ///
    /// Fails unless `lower_bound <= nominal_value <= upper_bound` holds on
    /// linear scale.
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::parameters::{ParameterRecord, Scale};
    ///
    /// let k1 = ParameterRecord::new("k1", 2.0, 0.0, 10.0, Scale::Lin, true).unwrap();
    /// assert_eq!(k1.id(), "k1");
    /// assert!(k1.estimate());
    /// assert!(ParameterRecord::new("k2", 20.0, 0.0, 10.0, Scale::Lin, true).is_err());
    /// ```
    pub fn new(
        id: &str,
        nominal_value: f64,
        lower_bound: f64,
        upper_bound: f64,
        scale: Scale,
        estimate: bool,
    ) -> Result<Self, ParameterError> {
        let to_error = |source| ParameterError::Bounds {
            id: id.to_string(),
            source,
        };
        let bounds = Bounds::new(lower_bound, upper_bound).map_err(to_error)?;
        bounds.check(nominal_value).map_err(to_error)?;

        Ok(Self {
            id: id.to_string(),
            name: None,
            nominal_value,
            bounds,
            scale,
            estimate,
            initialization_prior: None,
            objective_prior: None,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_initialization_prior(mut self, prior: Option<Prior>) -> Self {
        self.initialization_prior = prior;
        self
    }

    pub fn with_objective_prior(mut self, prior: Option<Prior>) -> Self {
        self.objective_prior = prior;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn nominal_value(&self) -> f64 {
        self.nominal_value
    }

    pub fn lower_bound(&self) -> f64 {
        self.bounds.lower
    }

    pub fn upper_bound(&self) -> f64 {
        self.bounds.upper
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn estimate(&self) -> bool {
        self.estimate
    }

    /// Nominal value on the parameter's estimation scale
    pub fn scaled_nominal_value(&self) -> f64 {
        self.scale.scale(self.nominal_value)
    }

    /// The prior for `usage`, falling back to a uniform distribution over the
    /// scaled bounds when none was given
    pub fn prior(&self, usage: PriorUse) -> Prior {
        let explicit = match usage {
            PriorUse::Initialization => self.initialization_prior,
            PriorUse::Objective => self.objective_prior,
        };
        explicit.unwrap_or_else(|| {
            let scaled = self.bounds.scaled(self.scale);
            Prior {
                kind: PriorKind::ParameterScaleUniform,
                parameters: (scaled.lower, scaled.upper),
            }
        })
    }
}
