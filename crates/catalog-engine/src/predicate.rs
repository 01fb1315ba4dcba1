//! # Predicate Builder
//!
//! Compiles a [`CanonicalQuery`] into a [`Predicate`]: the AND of
//!
//! - one search clause (an OR over the searchable fields, case-insensitive substring),
//! - one categorical clause per filtered field (an OR over the selected values),
//! - one inclusive range clause per bounded field.
//!
//! Clauses are kept separate rather than fused into a closure so the facet calculator can
//! evaluate "everything except clause X" without rebuilding anything.

use crate::config::ResourceConfig;
use crate::query::{CanonicalQuery, RangeBounds};
use crate::value::Item;
use std::collections::BTreeSet;

/// An excludable clause of a [`Predicate`], addressed by its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseId {
    Categorical(usize),
    Range(usize),
}

/// Outcome of evaluating every clause against one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Every clause holds.
    Match,
    /// Exactly one excludable clause fails; the item belongs to that clause's facet scope.
    FailsOnly(ClauseId),
    /// The search clause fails, or two or more clauses fail.
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
struct SearchClause {
    needle: String,
    fields: Vec<String>,
}

impl SearchClause {
    fn matches(&self, item: &Item) -> bool {
        self.fields.iter().any(|field| {
            item.get(field).is_some_and(|value| {
                value
                    .terms()
                    .iter()
                    .any(|term| term.to_lowercase().contains(&self.needle))
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalClause {
    pub field: String,
    pub selected: BTreeSet<String>,
}

impl CategoricalClause {
    /// Multi-valued attributes match when any of their values is selected.
    pub fn matches(&self, item: &Item) -> bool {
        item.get(&self.field).is_some_and(|value| {
            value
                .terms()
                .iter()
                .any(|term| self.selected.contains(term))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    pub field: String,
    pub bounds: RangeBounds,
}

impl RangeClause {
    /// Missing or non-numeric values never match.
    pub fn matches(&self, item: &Item) -> bool {
        item.get(&self.field)
            .and_then(|value| value.as_number())
            .is_some_and(|n| self.bounds.contains(n))
    }
}

/// The compiled query. Pure: it holds only data derived from the query and config.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    search: Option<SearchClause>,
    categorical: Vec<CategoricalClause>,
    ranges: Vec<RangeClause>,
}

impl Predicate {
    pub fn build(query: &CanonicalQuery, config: &ResourceConfig) -> Self {
        let search = (!query.search.is_empty()).then(|| SearchClause {
            needle: query.search.to_lowercase(),
            fields: config.searchable_fields.clone(),
        });

        let categorical = query
            .categorical_filters
            .iter()
            .map(|(field, selected)| CategoricalClause {
                field: field.clone(),
                selected: selected.clone(),
            })
            .collect();

        let ranges = query
            .range_filters
            .iter()
            .map(|(field, bounds)| RangeClause {
                field: field.clone(),
                bounds: *bounds,
            })
            .collect();

        Self {
            search,
            categorical,
            ranges,
        }
    }

    pub fn categorical_clauses(&self) -> &[CategoricalClause] {
        &self.categorical
    }

    pub fn range_clauses(&self) -> &[RangeClause] {
        &self.ranges
    }

    /// The clause filtering `field` categorically, if the query filters it.
    pub fn categorical_clause_for(&self, field: &str) -> Option<ClauseId> {
        self.categorical
            .iter()
            .position(|c| c.field == field)
            .map(ClauseId::Categorical)
    }

    /// The clause bounding `field`, if the query bounds it.
    pub fn range_clause_for(&self, field: &str) -> Option<ClauseId> {
        self.ranges
            .iter()
            .position(|c| c.field == field)
            .map(ClauseId::Range)
    }

    fn clause_matches(&self, id: ClauseId, item: &Item) -> bool {
        match id {
            ClauseId::Categorical(i) => self.categorical[i].matches(item),
            ClauseId::Range(i) => self.ranges[i].matches(item),
        }
    }

    fn clause_ids(&self) -> impl Iterator<Item = ClauseId> {
        (0..self.categorical.len())
            .map(ClauseId::Categorical)
            .chain((0..self.ranges.len()).map(ClauseId::Range))
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.evaluate(item) == Evaluation::Match
    }

    /// Holds when every clause except `skip` holds.
    pub fn matches_except(&self, item: &Item, skip: ClauseId) -> bool {
        match self.evaluate(item) {
            Evaluation::Match => true,
            Evaluation::FailsOnly(id) => id == skip,
            Evaluation::Rejected => false,
        }
    }

    /// Evaluates all clauses, stopping as soon as a second failure is seen.
    pub fn evaluate(&self, item: &Item) -> Evaluation {
        if let Some(search) = &self.search {
            if !search.matches(item) {
                return Evaluation::Rejected;
            }
        }

        let mut failed = None;
        for id in self.clause_ids() {
            if self.clause_matches(id, item) {
                continue;
            }
            if failed.is_some() {
                return Evaluation::Rejected;
            }
            failed = Some(id);
        }

        match failed {
            None => Evaluation::Match,
            Some(id) => Evaluation::FailsOnly(id),
        }
    }
}
