use thiserror::Error;

use crate::parameters::expression::ExpressionError;

/// Error types for the petab-rs library.
#[derive(Error, Debug)]
pub enum PetabError {
    /// Unknown parameter scale tag.
    #[error("Invalid parameter scaling: '{0}'")]
    InvalidScale(String),

    /// Paired sequences of different length.
    #[error("Shape mismatch: expected {expected} elements, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Condition id not present in the condition table.
    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    /// Observable id not present in the observable table.
    #[error("Unknown observable: {0}")]
    UnknownObservable(String),

    /// Parameter id not present in the parameter table.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Override values differ between rows of the same measurement group.
    #[error(
        "Timepoint-specific {kind} parameter overrides for observable '{observable_id}' \
         in condition '{condition}' are not supported"
    )]
    TimepointSpecificNumericOverride {
        condition: String,
        observable_id: String,
        kind: String,
    },

    /// Two sources at the same precedence level assign different values.
    #[error("Ambiguous override of '{parameter}' in condition '{condition}': {first} vs. {second}")]
    AmbiguousOverride {
        condition: String,
        parameter: String,
        first: String,
        second: String,
    },

    /// Unsupported PEtab format version.
    #[error("Unsupported PEtab format version '{found}', expected '{expected}'")]
    UnresolvedVersion { found: String, expected: String },

    /// Parameter id occurs more than once in the parameter table.
    #[error("Duplicate parameter id: {0}")]
    DuplicateParameter(String),

    /// Observable id occurs more than once in the observable table.
    #[error("Duplicate observable id: {0}")]
    DuplicateObservable(String),

    /// Bounds or nominal value violate `lower <= nominal <= upper`.
    #[error("Invalid bounds for parameter '{id}': {message}")]
    InvalidBounds { id: String, message: String },

    /// Placeholder numbering or override count does not fit the formula.
    #[error("Invalid placeholder for observable '{observable_id}': {message}")]
    InvalidPlaceholder {
        observable_id: String,
        message: String,
    },

    /// Malformed table cell value.
    #[error("Invalid value '{value}': {message}")]
    InvalidValue { value: String, message: String },

    /// Unknown noise distribution tag.
    #[error("Unsupported noise distribution: '{0}'")]
    InvalidNoiseDistribution(String),

    /// Unknown prior kind or malformed prior parameters.
    #[error("Invalid prior for parameter '{id}': {message}")]
    InvalidPrior { id: String, message: String },

    /// Formula parsing or evaluation error.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Numeric evaluation could not be completed.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for petab-rs operations.
pub type Result<T> = std::result::Result<T, PetabError>;
