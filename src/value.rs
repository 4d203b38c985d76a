//! Table cell values that are either a number or a parameter id
//!
//! Condition table cells, measurement table override lists and the entries of
//! a parameter mapping all hold the same kind of value: a literal number or a
//! symbolic reference to another parameter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PetabError, Result};

/// A numeric literal or a reference to a parameter id.
///
/// Equality treats two NaN literals as the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Numeric(f64),
    Parameter(String),
}

impl ParameterValue {
    /// Parse one token: anything that reads as a float is numeric, everything
    /// else is a parameter id. `inf`, `-inf` and `nan` are numbers. Empty
    /// tokens are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::ParameterValue;
    ///
    /// assert_eq!(ParameterValue::parse("1.5").unwrap(), ParameterValue::Numeric(1.5));
    /// assert_eq!(ParameterValue::parse(" k1 ").unwrap(), ParameterValue::Parameter("k1".into()));
    /// assert!(ParameterValue::parse(" ").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PetabError::InvalidValue {
                value: token.to_string(),
                message: "empty value".to_string(),
            });
        }
        Ok(match token.parse::<f64>() {
            Ok(value) => ParameterValue::Numeric(value),
            Err(_) => ParameterValue::Parameter(token.to_string()),
        })
    }

    /// Split a `;`-separated override cell. An empty cell has no overrides;
    /// an empty entry inside a non-empty cell is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::ParameterValue;
    ///
    /// assert!(ParameterValue::parse_list("").unwrap().is_empty());
    /// assert_eq!(
    ///     ParameterValue::parse_list("param1;2.2").unwrap(),
    ///     vec![ParameterValue::Parameter("param1".into()), ParameterValue::Numeric(2.2)]
    /// );
    /// assert!(ParameterValue::parse_list("a;;b").is_err());
    /// ```
    pub fn parse_list(cell: &str) -> Result<Vec<Self>> {
        if cell.trim().is_empty() {
            return Ok(Vec::new());
        }
        cell.split(';')
            .map(|token| {
                Self::parse(token).map_err(|_| PetabError::InvalidValue {
                    value: cell.to_string(),
                    message: "empty entry in override list".to_string(),
                })
            })
            .collect()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterValue::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ParameterValue::Numeric(value) => Some(*value),
            ParameterValue::Parameter(_) => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&str> {
        match self {
            ParameterValue::Numeric(_) => None,
            ParameterValue::Parameter(id) => Some(id),
        }
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterValue::Numeric(a), ParameterValue::Numeric(b)) => a == b || (a.is_nan() && b.is_nan()),
            (ParameterValue::Parameter(a), ParameterValue::Parameter(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Numeric(value) => write!(f, "{}", value),
            ParameterValue::Parameter(id) => f.write_str(id),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Numeric(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(id: &str) -> Self {
        ParameterValue::Parameter(id.to_string())
    }
}
