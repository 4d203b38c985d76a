//! # petab-rs
//!
//! `petab-rs` models PEtab parameter estimation problems: a dynamical model
//! plus condition, measurement, parameter and observable tables. Its core is
//! the parameter mapping and scaling engine that reconciles the model's native
//! parameters with the optimizer's parameter vector across experimental
//! conditions, observables and measurement-specific overrides.
//!
//! The library provides:
//! - Parameter tables with free/fixed masking, bounds, scales and priors
//! - `lin` / `log` / `log10` scale transforms
//! - Condition, observable and measurement tables with placeholder handling
//! - Per-condition optimization-to-simulation parameter mappings
//! - Startpoint sampling, residuals and likelihoods
//!
//! ## Basic Usage
//!
//! ```
//! use petab_rs::conditions::{ConditionRecord, ConditionTable};
//! use petab_rs::measurements::{MeasurementRecord, MeasurementTable};
//! use petab_rs::model::SimpleModel;
//! use petab_rs::observables::{ObservableRecord, ObservableTable};
//! use petab_rs::parameters::{ParameterRecord, ParameterTable, Scale};
//! use petab_rs::{MappingConfig, ParameterValue, Problem};
//!
//! let model = SimpleModel::new().with_parameter("k1", 1.0).with_entity("A");
//! let problem = Problem::new(
//!     "1",
//!     model,
//!     ConditionTable::new(vec![ConditionRecord::new("c1")]).unwrap(),
//!     MeasurementTable::new(vec![MeasurementRecord::new("obs_a", "c1", 1.0, 0.5)]),
//!     ParameterTable::new(vec![
//!         ParameterRecord::new("k1", 1.0, 0.01, 100.0, Scale::Log10, true).unwrap(),
//!         ParameterRecord::new("sigma", 0.1, 0.01, 1.0, Scale::Lin, false).unwrap(),
//!     ])
//!     .unwrap(),
//!     ObservableTable::new(vec![ObservableRecord::new("obs_a", "A", "sigma")]).unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(problem.x_free_ids(), vec!["k1"]);
//! assert_eq!(problem.ub(true, false, true), vec![2.0]);
//!
//! let result = problem.parameter_mapping(MappingConfig::default()).unwrap();
//! let mapping = &result.mappings[0].simulation;
//! assert_eq!(mapping.get("k1"), Some(&ParameterValue::from("k1")));
//! assert_eq!(mapping.get("sigma"), Some(&ParameterValue::Numeric(0.1)));
//! ```

pub mod error;

// Parameter table, scales and formulas
pub mod parameters;

pub mod calculate;
pub mod conditions;
pub mod mapping;
pub mod measurements;
pub mod model;
pub mod observables;
pub mod problem;
pub mod sampling;
pub mod value;

// Re-exports for convenience
pub use error::{PetabError, Result};
pub use mapping::{MappingConfig, MappingResult, MappingWarning, ParameterMapping, ParameterMappingEngine};
pub use measurements::SimulationCondition;
pub use model::{Model, SimpleModel};
pub use parameters::{ParameterTable, Scale};
pub use problem::{Problem, FORMAT_VERSION};
pub use value::ParameterValue;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
