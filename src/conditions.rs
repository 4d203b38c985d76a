//! Condition table and condition resolution
//!
//! A condition is a named set of model parameter overrides describing one
//! experimental setup. Rows sharing a condition id are merged when the table is
//! built; conflicting assignments to the same target are rejected there, so
//! every later lookup sees at most one value per (condition, target).

use crate::error::{PetabError, Result};
use crate::model::Model;
use crate::parameters::ParameterTable;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// One condition: id, optional display name and its overrides in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: String,
    pub name: Option<String>,
    pub overrides: Vec<(String, ParameterValue)>,
}

impl ConditionRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            overrides: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add an override for a model parameter (or other model target)
    pub fn with_override(mut self, target: &str, value: impl Into<ParameterValue>) -> Self {
        self.overrides.push((target.to_string(), value.into()));
        self
    }

    /// Value assigned to `target` in this condition
    pub fn get(&self, target: &str) -> Option<&ParameterValue> {
        self.overrides
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, value)| value)
    }
}

/// Validated condition table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConditionRecord>", into = "Vec<ConditionRecord>")]
pub struct ConditionTable {
    records: Vec<ConditionRecord>,
    index: HashMap<String, usize>,
}

impl TryFrom<Vec<ConditionRecord>> for ConditionTable {
    type Error = PetabError;

    fn try_from(rows: Vec<ConditionRecord>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<ConditionTable> for Vec<ConditionRecord> {
    fn from(table: ConditionTable) -> Self {
        table.records
    }
}

impl ConditionTable {
    /// Build the table from rows, merging rows with the same id.
    ///
    /// Identical repeated assignments are merged silently; different values
    /// for the same (condition, target) fail with `AmbiguousOverride`, as do
    /// duplicate targets within a single row.
    pub fn new(rows: Vec<ConditionRecord>) -> Result<Self> {
        let mut records: Vec<ConditionRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let position = match index.get(&row.id) {
                Some(&i) => i,
                None => {
                    index.insert(row.id.clone(), records.len());
                    records.push(ConditionRecord {
                        id: row.id.clone(),
                        name: row.name.clone(),
                        overrides: Vec::new(),
                    });
                    records.len() - 1
                }
            };
            let record = &mut records[position];
            if record.name.is_none() {
                record.name = row.name;
            }

            for (target, value) in row.overrides {
                match record.get(&target) {
                    Some(existing) if *existing == value => {}
                    Some(existing) => {
                        return Err(PetabError::AmbiguousOverride {
                            condition: record.id.clone(),
                            parameter: target,
                            first: existing.to_string(),
                            second: value.to_string(),
                        })
                    }
                    None => record.overrides.push((target, value)),
                }
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

    pub fn get(&self, id: &str) -> Option<&ConditionRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Condition ids in table order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionRecord> {
        self.records.iter()
    }

    /// All override targets ("condition table columns"), first-seen order
    pub fn targets(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|r| r.overrides.iter().map(|(target, _)| target))
            .filter(|target| seen.insert(target.as_str()))
            .cloned()
            .collect()
    }

    /// Parameter ids referenced symbolically anywhere in the table,
    /// first-seen order
    pub fn parametric_overrides(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .flat_map(|r| r.overrides.iter().filter_map(|(_, value)| value.as_parameter()))
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }
}

/// Resolves the model parameter values in effect for a condition.
///
/// Holds only borrows; every call recomputes from the tables.
pub struct ConditionResolver<'a, M: Model + ?Sized> {
    conditions: &'a ConditionTable,
    model: &'a M,
    parameters: Option<&'a ParameterTable>,
}

impl<'a, M: Model + ?Sized> ConditionResolver<'a, M> {
    pub fn new(conditions: &'a ConditionTable, model: &'a M) -> Self {
        Self {
            conditions,
            model,
            parameters: None,
        }
    }

    /// Model parameters listed in `parameters` resolve to their table entry
    /// instead of the model default
    pub fn with_parameter_table(mut self, parameters: &'a ParameterTable) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Overrides defined for `condition_id`
    pub fn overrides(&self, condition_id: &str) -> Result<&'a [(String, ParameterValue)]> {
        self.conditions
            .get(condition_id)
            .map(|record| record.overrides.as_slice())
            .ok_or_else(|| PetabError::UnknownCondition(condition_id.to_string()))
    }

    /// Model defaults overlaid with the condition's overrides.
    ///
    /// Targets that are not model parameters (e.g. species initial values)
    /// are included as well.
    pub fn resolve(&self, condition_id: &str) -> Result<BTreeMap<String, ParameterValue>> {
        let overrides = self.overrides(condition_id)?;
        let in_table = |id: &str| self.parameters.map_or(false, |table| table.contains(id));
        let mut resolved: BTreeMap<String, ParameterValue> = self
            .model
            .parameters()
            .into_iter()
            .map(|(id, default)| {
                let value = if in_table(&id) {
                    ParameterValue::Parameter(id.clone())
                } else {
                    ParameterValue::Numeric(default)
                };
                (id, value)
            })
            .collect();
        for (target, value) in overrides {
            resolved.insert(target.clone(), value.clone());
        }
        Ok(resolved)
    }
}
