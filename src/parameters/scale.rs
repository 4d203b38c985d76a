//! Parameter scale transformations
//!
//! Optimizers usually work on a transformed parameter space. PEtab allows three
//! scales per parameter: linear, natural log and base-10 log. This module
//! provides the forward (`scale`) and inverse (`unscale`) transforms, for single
//! values and element-wise over slices.

use crate::error::{PetabError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Scale on which a parameter is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scale {
    /// Identity
    #[default]
    #[serde(rename = "lin")]
    Lin,

    /// Natural logarithm
    #[serde(rename = "log")]
    Log,

    /// Base-10 logarithm
    #[serde(rename = "log10")]
    Log10,
}

impl Scale {
    /// The tag used in PEtab tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Lin => "lin",
            Scale::Log => "log",
            Scale::Log10 => "log10",
        }
    }

    /// Transform a linear-scale value onto this scale
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::parameters::Scale;
    ///
    /// assert_eq!(Scale::Lin.scale(5.0), 5.0);
    /// assert_eq!(Scale::Log10.scale(100.0), 2.0);
    /// ```
    pub fn scale(&self, value: f64) -> f64 {
        match self {
            Scale::Lin => value,
            Scale::Log => value.ln(),
            Scale::Log10 => value.log10(),
        }
    }

    /// Transform a value on this scale back to linear scale
    pub fn unscale(&self, value: f64) -> f64 {
        match self {
            Scale::Lin => value,
            Scale::Log => value.exp(),
            Scale::Log10 => 10f64.powf(value),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = PetabError;

    /// Parse a scale tag. An empty tag means linear.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "lin" | "linear" => Ok(Scale::Lin),
            "log" => Ok(Scale::Log),
            "log10" => Ok(Scale::Log10),
            other => Err(PetabError::InvalidScale(other.to_string())),
        }
    }
}

/// Scale a value given a scale tag
pub fn scale(value: f64, scale_str: &str) -> Result<f64> {
    Ok(scale_str.parse::<Scale>()?.scale(value))
}

/// Unscale a value given a scale tag
pub fn unscale(value: f64, scale_str: &str) -> Result<f64> {
    Ok(scale_str.parse::<Scale>()?.unscale(value))
}

fn check_shape(values: &[f64], scales: &[Scale]) -> Result<()> {
    if values.len() != scales.len() {
        return Err(PetabError::ShapeMismatch {
            expected: values.len(),
            found: scales.len(),
        });
    }
    Ok(())
}

/// Element-wise `scale` over paired slices
pub fn map_scale(values: &[f64], scales: &[Scale]) -> Result<Vec<f64>> {
    check_shape(values, scales)?;
    Ok(values
        .iter()
        .zip(scales)
        .map(|(&v, s)| s.scale(v))
        .collect())
}

/// Element-wise `unscale` over paired slices
pub fn map_unscale(values: &[f64], scales: &[Scale]) -> Result<Vec<f64>> {
    check_shape(values, scales)?;
    Ok(values
        .iter()
        .zip(scales)
        .map(|(&v, s)| s.unscale(v))
        .collect())
}

/// Apply one scale to all values
pub fn broadcast_scale(values: &[f64], scale: Scale) -> Vec<f64> {
    values.iter().map(|&v| scale.scale(v)).collect()
}

/// Apply one inverse scale to all values
pub fn broadcast_unscale(values: &[f64], scale: Scale) -> Vec<f64> {
    values.iter().map(|&v| scale.unscale(v)).collect()
}

/// Transform a map of id -> value using a per-id scale lookup.
///
/// `forward` selects `scale` (true) or `unscale` (false). Ids without a scale
/// in `lookup` are rejected.
pub fn map_values<F>(
    values: &HashMap<String, f64>,
    lookup: F,
    forward: bool,
) -> Result<HashMap<String, f64>>
where
    F: Fn(&str) -> Option<Scale>,
{
    values
        .iter()
        .map(|(id, &value)| {
            let scale = lookup(id).ok_or_else(|| PetabError::UnknownParameter(id.clone()))?;
            let transformed = if forward {
                scale.scale(value)
            } else {
                scale.unscale(value)
            };
            Ok((id.clone(), transformed))
        })
        .collect()
}
