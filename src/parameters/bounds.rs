//! Parameter bounds
//!
//! Bounds are always stored on linear scale. `Bounds::scaled` maps them onto a
//! parameter's estimation scale, which is what optimizers see.

use crate::parameters::scale::Scale;
use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: lower ({lower}) must not exceed upper ({upper})")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Value {value} is outside bounds: [{lower}, {upper}]")]
    ValueOutsideBounds { value: f64, lower: f64, upper: f64 },

    #[error("Bound is NaN")]
    NanBound,
}

/// Lower and upper bound of a parameter, on linear scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        // JSON has no infinity; unbounded sides are written as null
        let mut state = serializer.serialize_struct("Bounds", 2)?;
        let lower = (!(self.lower.is_infinite() && self.lower.is_sign_negative())).then_some(self.lower);
        let upper = (!(self.upper.is_infinite() && self.upper.is_sign_positive())).then_some(self.upper);
        state.serialize_field("lower", &lower)?;
        state.serialize_field("upper", &upper)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            lower: Option<f64>,

            #[serde(default)]
            upper: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        Bounds::new(
            helper.lower.unwrap_or(NEG_INFINITY),
            helper.upper.unwrap_or(INFINITY),
        )
        .map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: NEG_INFINITY,
            upper: INFINITY,
        }
    }
}

impl Bounds {
    /// Create bounds, rejecting NaN and `lower > upper`
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.lower, 0.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> Result<Self, BoundsError> {
        if lower.is_nan() || upper.is_nan() {
            return Err(BoundsError::NanBound);
        }
        if lower > upper {
            return Err(BoundsError::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// `(-inf, inf)`
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Check that `value` lies within the bounds
    pub fn check(&self, value: f64) -> Result<(), BoundsError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(BoundsError::ValueOutsideBounds {
                value,
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    /// Clamp a value into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }

    /// The bounds transformed onto `scale`. The transforms are monotonic, so
    /// the order of the two sides is preserved.
    pub fn scaled(&self, scale: Scale) -> Bounds {
        Bounds {
            lower: scale.scale(self.lower),
            upper: scale.scale(self.upper),
        }
    }
}
