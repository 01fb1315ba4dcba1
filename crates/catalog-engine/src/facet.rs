//! # Facet Calculator
//!
//! Computes filter metadata independent of pagination, using **leave-one-out** scoping:
//! the facet for field `f` is computed over the items that satisfy every clause of the
//! predicate *except* `f`'s own clause. A facet therefore shows what remains selectable given
//! all the *other* active filters, and changing `f`'s selection never changes `f`'s own counts.
//!
//! ## Single pass
//!
//! Scoping is decided per item from one [`Predicate::evaluate`] call:
//!
//! | Evaluation | Contributes to |
//! |------------|----------------|
//! | `Match` | every facet |
//! | `FailsOnly(c)` | only the facet of the field owning clause `c` |
//! | `Rejected` | no facet |
//!
//! An item failing two clauses is outside every scope, since each scope drops only one
//! clause. This keeps the cost at one predicate evaluation per item plus one tally per
//! (item, faceted field), instead of one full filtering pass per field.

use crate::config::ResourceConfig;
use crate::predicate::{ClauseId, Evaluation, Predicate};
use crate::value::{parse_number, FieldValue, Item};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// A distinct categorical value. Numeric values order first, by value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FacetValue {
    Number(f64),
    Text(String),
}

impl FacetValue {
    fn from_field(value: &FieldValue) -> Vec<FacetValue> {
        match value {
            FieldValue::Number(n) => vec![FacetValue::Number(*n)],
            FieldValue::Text(s) => vec![FacetValue::Text(s.clone())],
            FieldValue::List(values) => values.iter().cloned().map(FacetValue::Text).collect(),
            FieldValue::Null => Vec::new(),
        }
    }
}

/// Counts for one categorical field, keyed by the rendered term the categorical
/// predicate compares against. `3` and `"3"` select the same items, so they share
/// one entry; it stays numeric only while every occurrence is a number.
#[derive(Debug, Default)]
struct Tally {
    entries: BTreeMap<String, (FacetValue, usize)>,
}

impl Tally {
    /// Counts `value` once per distinct term, however often a list repeats it.
    fn add(&mut self, value: &FieldValue) {
        let distinct: BTreeMap<String, FacetValue> = FacetValue::from_field(value)
            .into_iter()
            .map(|v| (v.to_string(), v))
            .collect();
        for (term, value) in distinct {
            let entry = self.entries.entry(term).or_insert((value.clone(), 0));
            if let (FacetValue::Number(_), FacetValue::Text(_)) = (&entry.0, &value) {
                entry.0 = value;
            }
            entry.1 += 1;
        }
    }

    fn into_counts(self) -> Vec<FacetCount> {
        let mut counts: Vec<FacetCount> = self
            .entries
            .into_values()
            .map(|(value, count)| FacetCount { value, count })
            .collect();
        counts.sort_by(|a, b| a.value.cmp(&b.value));
        counts
    }
}

/// Same order the sorter uses: numeric values by value, then other strings.
impl Ord for FacetValue {
    fn cmp(&self, other: &Self) -> Ordering {
        let number = |v: &FacetValue| match v {
            FacetValue::Number(n) => Some(*n),
            FacetValue::Text(s) => parse_number(s),
        };
        match (number(self), number(other)) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| match (self, other) {
                (FacetValue::Text(a), FacetValue::Text(b)) => a.cmp(b),
                (FacetValue::Number(_), FacetValue::Text(_)) => Ordering::Less,
                (FacetValue::Text(_), FacetValue::Number(_)) => Ordering::Greater,
                (FacetValue::Number(_), FacetValue::Number(_)) => Ordering::Equal,
            }),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (FacetValue::Text(a), FacetValue::Text(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl PartialOrd for FacetValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FacetValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FacetValue {}

impl Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Number(n) => Display::fmt(&FieldValue::Number(*n), f),
            FacetValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::Text(value.to_string())
    }
}

impl From<f64> for FacetValue {
    fn from(value: f64) -> Self {
        FacetValue::Number(value)
    }
}

/// One `(value, count)` pair of a categorical facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: FacetValue,
    pub count: usize,
}

/// Observed bounds of a range facet. `0..0` when the scope holds no numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RangeFacet {
    pub min: f64,
    pub max: f64,
}

impl RangeFacet {
    fn widen(current: Option<RangeFacet>, value: f64) -> RangeFacet {
        match current {
            None => RangeFacet {
                min: value,
                max: value,
            },
            Some(r) => RangeFacet {
                min: r.min.min(value),
                max: r.max.max(value),
            },
        }
    }
}

/// Facets for every declared categorical and range field of a resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetSet {
    /// Field → entries ordered by value.
    pub categorical: BTreeMap<String, Vec<FacetCount>>,
    pub ranges: BTreeMap<String, RangeFacet>,
}

impl FacetSet {
    /// Count for one value of a categorical facet; `0` when the value is not present.
    pub fn count(&self, field: &str, value: impl Into<FacetValue>) -> usize {
        let value = value.into();
        self.categorical
            .get(field)
            .and_then(|entries| entries.iter().find(|e| e.value == value))
            .map_or(0, |e| e.count)
    }
}

/// Whether an item with the given evaluation falls in the scope of a field whose own
/// clause is `own` (or which has no clause).
fn in_scope(evaluation: Evaluation, own: Option<ClauseId>) -> bool {
    match evaluation {
        Evaluation::Match => true,
        Evaluation::FailsOnly(failed) => own == Some(failed),
        Evaluation::Rejected => false,
    }
}

/// Computes all facets over the full item snapshot in one pass.
pub fn compute(items: &[Item], predicate: &Predicate, config: &ResourceConfig) -> FacetSet {
    let categorical_fields: Vec<(&str, Option<ClauseId>)> = config
        .filterable_fields
        .iter()
        .map(|f| (f.as_str(), predicate.categorical_clause_for(f)))
        .collect();
    let range_fields: Vec<(&str, Option<ClauseId>)> = config
        .range_fields
        .iter()
        .map(|f| (f.as_str(), predicate.range_clause_for(f)))
        .collect();

    let mut tallies: Vec<Tally> = categorical_fields.iter().map(|_| Tally::default()).collect();
    let mut bounds: Vec<Option<RangeFacet>> = vec![None; range_fields.len()];

    for item in items {
        let evaluation = predicate.evaluate(item);
        if evaluation == Evaluation::Rejected {
            continue;
        }

        for ((field, own), tally) in categorical_fields.iter().zip(tallies.iter_mut()) {
            if !in_scope(evaluation, *own) {
                continue;
            }
            if let Some(value) = item.get(field) {
                tally.add(value);
            }
        }

        for ((field, own), bound) in range_fields.iter().zip(bounds.iter_mut()) {
            if !in_scope(evaluation, *own) {
                continue;
            }
            if let Some(n) = item.get(field).and_then(FieldValue::as_number) {
                *bound = Some(RangeFacet::widen(*bound, n));
            }
        }
    }

    let categorical = categorical_fields
        .iter()
        .zip(tallies)
        .map(|((field, _), tally)| (field.to_string(), tally.into_counts()))
        .collect();

    let ranges = range_fields
        .iter()
        .zip(bounds)
        .map(|((field, _), bound)| (field.to_string(), bound.unwrap_or_default()))
        .collect();

    FacetSet { categorical, ranges }
}
