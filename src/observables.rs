//! Observable table and observable resolution
//!
//! Observables map model state to measurable quantities. Their formulas may
//! contain positional placeholders, `observableParameter{n}_{observableId}` in
//! the observable formula and `noiseParameter{n}_{observableId}` in the noise
//! formula, which the measurement table fills in per measurement group.

use crate::error::{PetabError, Result};
use crate::model::Model;
use crate::parameters::{Expression, Scale};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Symbol for simulation time; never a parameter
pub const TIME_SYMBOL: &str = "time";

/// Noise distribution of an observable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoiseDistribution {
    /// Default when the table leaves the distribution unspecified
    #[default]
    Normal,
    Laplace,
}

impl std::str::FromStr for NoiseDistribution {
    type Err = PetabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "normal" => Ok(NoiseDistribution::Normal),
            "laplace" => Ok(NoiseDistribution::Laplace),
            other => Err(PetabError::InvalidNoiseDistribution(other.to_string())),
        }
    }
}

/// Which formula a placeholder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Observable,
    Noise,
}

impl PlaceholderKind {
    fn prefix(&self) -> &'static str {
        match self {
            PlaceholderKind::Observable => "observable",
            PlaceholderKind::Noise => "noise",
        }
    }

    /// Name of the `n`-th (1-based) placeholder of an observable
    pub fn placeholder(&self, n: usize, observable_id: &str) -> String {
        format!("{}Parameter{}_{}", self.prefix(), n, observable_id)
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One row of the observable table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableRecord {
    pub id: String,
    pub name: Option<String>,
    pub formula: String,
    pub noise_formula: String,
    #[serde(default)]
    pub transformation: Scale,
    #[serde(default)]
    pub noise_distribution: NoiseDistribution,
}

impl ObservableRecord {
    /// Observable with linear transformation and normal noise
    pub fn new(id: &str, formula: &str, noise_formula: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            formula: formula.to_string(),
            noise_formula: noise_formula.to_string(),
            transformation: Scale::Lin,
            noise_distribution: NoiseDistribution::Normal,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_transformation(mut self, transformation: Scale) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn with_noise_distribution(mut self, distribution: NoiseDistribution) -> Self {
        self.noise_distribution = distribution;
        self
    }

    /// The formula text for the given placeholder kind
    pub fn formula_for(&self, kind: PlaceholderKind) -> &str {
        match kind {
            PlaceholderKind::Observable => &self.formula,
            PlaceholderKind::Noise => &self.noise_formula,
        }
    }
}

/// Parse a formula; an empty formula has no symbols
pub(crate) fn parse_formula(formula: &str) -> Result<Option<Expression>> {
    if formula.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Expression::parse(formula)?))
}

/// Symbols of a formula, sorted
pub fn formula_symbols(formula: &str) -> Result<Vec<String>> {
    Ok(parse_formula(formula)?
        .map(|expr| expr.variables())
        .unwrap_or_default())
}

/// Placeholders of `kind` in `formula`, in the order expected by the
/// measurement table override columns.
///
/// Numbering must be consecutive from 1.
pub fn formula_placeholders(
    formula: &str,
    observable_id: &str,
    kind: PlaceholderKind,
) -> Result<Vec<String>> {
    let prefix = format!("{}Parameter", kind.prefix());
    let suffix = format!("_{}", observable_id);

    let found: HashSet<String> = formula_symbols(formula)?
        .into_iter()
        .filter(|symbol| {
            symbol
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(&suffix))
                .map_or(false, |digits| {
                    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
                })
        })
        .collect();

    let expected: Vec<String> = (1..=found.len())
        .map(|n| kind.placeholder(n, observable_id))
        .collect();
    if expected.iter().any(|p| !found.contains(p)) {
        let mut found: Vec<_> = found.into_iter().collect();
        found.sort();
        return Err(PetabError::InvalidPlaceholder {
            observable_id: observable_id.to_string(),
            message: format!("non-consecutive numbering of {} placeholders {:?}", kind, found),
        });
    }
    Ok(expected)
}

/// Validated observable table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ObservableRecord>", into = "Vec<ObservableRecord>")]
pub struct ObservableTable {
    records: Vec<ObservableRecord>,
    index: HashMap<String, usize>,
}

impl TryFrom<Vec<ObservableRecord>> for ObservableTable {
    type Error = PetabError;

    fn try_from(records: Vec<ObservableRecord>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<ObservableTable> for Vec<ObservableRecord> {
    fn from(table: ObservableTable) -> Self {
        table.records
    }
}

impl ObservableTable {
    /// Build the table. Ids must be unique and both formulas must parse with
    /// consecutively numbered placeholders.
    pub fn new(records: Vec<ObservableRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), i).is_some() {
                return Err(PetabError::DuplicateObservable(record.id.clone()));
            }
            for kind in [PlaceholderKind::Observable, PlaceholderKind::Noise] {
                formula_placeholders(record.formula_for(kind), &record.id, kind)?;
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

    pub fn get(&self, id: &str) -> Option<&ObservableRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Observable ids in table order
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObservableRecord> {
        self.records.iter()
    }
}

/// Looks up observables and derives their placeholders and output parameters
pub struct ObservableResolver<'a> {
    observables: &'a ObservableTable,
}

impl<'a> ObservableResolver<'a> {
    pub fn new(observables: &'a ObservableTable) -> Self {
        Self { observables }
    }

    /// Formula, noise formula and noise distribution of an observable
    pub fn resolve(&self, observable_id: &str) -> Result<&'a ObservableRecord> {
        self.observables
            .get(observable_id)
            .ok_or_else(|| PetabError::UnknownObservable(observable_id.to_string()))
    }

    /// Ordered placeholders of one observable
    pub fn placeholders(&self, observable_id: &str, kind: PlaceholderKind) -> Result<Vec<String>> {
        let record = self.resolve(observable_id)?;
        formula_placeholders(record.formula_for(kind), observable_id, kind)
    }

    fn kinds(observables: bool, noise: bool) -> Vec<PlaceholderKind> {
        let mut kinds = Vec::with_capacity(2);
        if observables {
            kinds.push(PlaceholderKind::Observable);
        }
        if noise {
            kinds.push(PlaceholderKind::Noise);
        }
        kinds
    }

    /// Placeholders of all observables, unique, table order
    pub fn all_placeholders(&self, observables: bool, noise: bool) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut placeholders = Vec::new();
        for record in self.observables.iter() {
            for kind in Self::kinds(observables, noise) {
                for p in formula_placeholders(record.formula_for(kind), &record.id, kind)? {
                    if seen.insert(p.clone()) {
                        placeholders.push(p);
                    }
                }
            }
        }
        Ok(placeholders)
    }

    /// Formula symbols of the given observables that are neither model
    /// entities nor `time`. Placeholders are included.
    pub fn output_parameters_for<M: Model + ?Sized>(
        &self,
        observable_ids: &[&str],
        model: &M,
        observables: bool,
        noise: bool,
    ) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut output = Vec::new();
        for id in observable_ids {
            let record = self.resolve(id)?;
            for kind in Self::kinds(observables, noise) {
                for symbol in formula_symbols(record.formula_for(kind))? {
                    if symbol != TIME_SYMBOL && !model.has_entity(&symbol) && seen.insert(symbol.clone()) {
                        output.push(symbol);
                    }
                }
            }
        }
        Ok(output)
    }

    /// [`Self::output_parameters_for`] over the whole table
    pub fn output_parameters<M: Model + ?Sized>(
        &self,
        model: &M,
        observables: bool,
        noise: bool,
    ) -> Result<Vec<String>> {
        self.output_parameters_for(&self.observables.ids(), model, observables, noise)
    }
}
