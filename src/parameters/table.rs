//! The parameter table
//!
//! [`ParameterTable`] is an ordered collection of [`ParameterRecord`]s keyed by
//! parameter id. It partitions parameters into free (estimated) and fixed ones
//! and exposes ids, nominal values and bounds filtered by that partition,
//! optionally on the parameters' estimation scales.
//!
//! All filtering is positional: the free/fixed index lists are computed from
//! the estimate flags and then used to select entries, so repeated values
//! across parameters are never confused.

use crate::error::{PetabError, Result};
use crate::parameters::parameter::{ParameterRecord, Prior, PriorKind, PriorUse};
use crate::parameters::scale::Scale;
use crate::parameters::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prior information for one estimated parameter
#[derive(Debug, Clone, PartialEq)]
pub struct PriorInfo {
    pub id: String,
    pub kind: PriorKind,
    pub parameters: (f64, f64),
    pub scale: Scale,
    /// Bounds on linear scale
    pub bounds: Bounds,
}

/// Validated PEtab parameter table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParameterRecord>", into = "Vec<ParameterRecord>")]
pub struct ParameterTable {
    records: Vec<ParameterRecord>,
    index: HashMap<String, usize>,
}

impl TryFrom<Vec<ParameterRecord>> for ParameterTable {
    type Error = PetabError;

    fn try_from(records: Vec<ParameterRecord>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<ParameterTable> for Vec<ParameterRecord> {
    fn from(table: ParameterTable) -> Self {
        table.records
    }
}

impl ParameterTable {
    /// Create a table from rows in table order. Ids must be unique.
    pub fn new(records: Vec<ParameterRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.id().to_string(), i).is_some() {
                return Err(PetabError::DuplicateParameter(record.id().to_string()));
            }
        }
        Ok(Self { records, index })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ParameterRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Rows in table order
    pub fn iter(&self) -> impl Iterator<Item = &ParameterRecord> {
        self.records.iter()
    }

    /// Scale of a parameter, if it is in the table
    pub fn scale_of(&self, id: &str) -> Option<Scale> {
        self.get(id).map(|record| record.scale())
    }

    /// Positions of estimated parameters, in table order
    pub fn free_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.estimate())
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions of non-estimated parameters, in table order
    pub fn fixed_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.estimate())
            .map(|(i, _)| i)
            .collect()
    }

    /// Reduce a full-length vector to the free and/or fixed entries
    fn apply_mask<T: Clone>(&self, values: Vec<T>, free: bool, fixed: bool) -> Vec<T> {
        match (free, fixed) {
            (true, true) => values,
            (false, false) => Vec::new(),
            (true, false) => self.free_indices().into_iter().map(|i| values[i].clone()).collect(),
            (false, true) => self.fixed_indices().into_iter().map(|i| values[i].clone()).collect(),
        }
    }

    /// Collect one value per row, optionally passed through the row's scale
    fn column<F>(&self, free: bool, fixed: bool, scaled: bool, get: F) -> Vec<f64>
    where
        F: Fn(&ParameterRecord) -> f64,
    {
        let values = self
            .records
            .iter()
            .map(|record| {
                let value = get(record);
                if scaled {
                    record.scale().scale(value)
                } else {
                    value
                }
            })
            .collect();
        self.apply_mask(values, free, fixed)
    }

    /// Parameter ids
    ///
    /// # Examples
    ///
    /// ```
    /// use petab_rs::parameters::{ParameterRecord, ParameterTable, Scale};
    ///
    /// let table = ParameterTable::new(vec![
    ///     ParameterRecord::new("k1", 2.0, 0.0, 10.0, Scale::Lin, true).unwrap(),
    ///     ParameterRecord::new("k2", 1.0, 0.0, 5.0, Scale::Log10, false).unwrap(),
    /// ])
    /// .unwrap();
    /// assert_eq!(table.ids(true, false), vec!["k1".to_string()]);
    /// assert_eq!(table.ids(false, true), vec!["k2".to_string()]);
    /// assert!(table.ids(false, false).is_empty());
    /// ```
    pub fn ids(&self, free: bool, fixed: bool) -> Vec<String> {
        let ids = self.records.iter().map(|r| r.id().to_string()).collect();
        self.apply_mask(ids, free, fixed)
    }

    /// Nominal values, optionally on parameter scale
    pub fn nominal(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.column(free, fixed, scaled, ParameterRecord::nominal_value)
    }

    /// Lower bounds, optionally on parameter scale
    pub fn lower_bounds(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.column(free, fixed, scaled, ParameterRecord::lower_bound)
    }

    /// Upper bounds, optionally on parameter scale
    pub fn upper_bounds(&self, free: bool, fixed: bool, scaled: bool) -> Vec<f64> {
        self.column(free, fixed, scaled, ParameterRecord::upper_bound)
    }

    /// Scales, one per selected row
    pub fn scales(&self, free: bool, fixed: bool) -> Vec<Scale> {
        let scales = self.records.iter().map(|r| r.scale()).collect();
        self.apply_mask(scales, free, fixed)
    }

    /// Ids of estimated parameters
    pub fn optimization_parameter_ids(&self) -> Vec<String> {
        self.ids(true, false)
    }

    /// Estimated parameter ids mapped to their scales
    pub fn optimization_parameter_scales(&self) -> HashMap<String, Scale> {
        self.records
            .iter()
            .filter(|r| r.estimate())
            .map(|r| (r.id().to_string(), r.scale()))
            .collect()
    }

    /// Prior information for every estimated parameter, in table order
    pub fn priors(&self, usage: PriorUse) -> Vec<PriorInfo> {
        self.records
            .iter()
            .filter(|r| r.estimate())
            .map(|r| {
                let Prior { kind, parameters } = r.prior(usage);
                PriorInfo {
                    id: r.id().to_string(),
                    kind,
                    parameters,
                    scale: r.scale(),
                    bounds: r.bounds(),
                }
            })
            .collect()
    }

    /// Scale a map of parameter id -> linear value onto parameter scale
    pub fn scale_parameters(&self, values: &HashMap<String, f64>) -> Result<HashMap<String, f64>> {
        crate::parameters::scale::map_values(values, |id| self.scale_of(id), true)
    }

    /// Map parameter id -> scaled value back to linear scale
    pub fn unscale_parameters(&self, values: &HashMap<String, f64>) -> Result<HashMap<String, f64>> {
        crate::parameters::scale::map_values(values, |id| self.scale_of(id), false)
    }
}
