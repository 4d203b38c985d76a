//! # Parameter Table and Scales
//!
//! This module holds everything about the optimization-facing parameter
//! vector: the rows of the PEtab parameter table, their bounds and estimation
//! scales, and the formula expressions that reference parameters.
//!
//! ## Core Components
//!
//! - [`ParameterRecord`]: one validated row (nominal value, bounds, scale, estimate flag, priors)
//! - [`ParameterTable`]: ordered rows with free/fixed masking
//! - [`Scale`]: `lin`, `log` and `log10` transforms, plus the vectorized [`map_scale`] / [`map_unscale`]
//! - [`Expression`]: parser and evaluator for observable and noise formulas
//!
//! ## Example Usage
//!
//! ```rust
//! use petab_rs::parameters::{ParameterRecord, ParameterTable, Scale};
//!
//! let table = ParameterTable::new(vec![
//!     ParameterRecord::new("k1", 2.0, 0.0, 10.0, Scale::Lin, true).unwrap(),
//!     ParameterRecord::new("k2", 1.0, 0.0, 5.0, Scale::Log10, false).unwrap(),
//! ])
//! .unwrap();
//!
//! // Free parameters on their estimation scale, e.g. as optimizer start point
//! let x0 = table.nominal(true, false, true);
//! assert_eq!(x0, vec![2.0]);
//!
//! // Bounds for the whole vector
//! let ub = table.upper_bounds(true, true, true);
//! assert_eq!(ub[0], 10.0);
//! ```

pub mod bounds;
pub mod expression;
pub mod parameter;
pub mod scale;
pub mod table;

pub use bounds::{Bounds, BoundsError};
pub use expression::{EvaluationContext, Expression, ExpressionError, SimpleContext};
pub use parameter::{ParameterError, ParameterRecord, Prior, PriorKind, PriorUse};
pub use scale::{map_scale, map_unscale, scale, unscale, Scale};
pub use table::{ParameterTable, PriorInfo};
