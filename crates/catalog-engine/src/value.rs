//! # Items & Field Values
//!
//! Every catalog resource stores its rows as [`Item`]s: a mapping from a raw field label
//! (e.g. `"Koelvermogen (kW)"`) to a [`FieldValue`]. The engine never knows which concrete
//! resource it is looking at; it only ever performs map lookups and matches on the value kind.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// The value kinds an item attribute can hold.
///
/// Serialized untagged, so an item round-trips as a plain JSON object:
/// `{"Merk": "Daikin", "Prijs": 1299.0, "Geschikt voor": ["woonkamer"], "Notitie": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    Null,
}

impl FieldValue {
    /// Numeric view used by range predicates and range facets.
    ///
    /// Strings holding a finite number count as numeric; lists and nulls never do.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The string forms this value contributes to categorical matching and search.
    pub fn terms(&self) -> Vec<String> {
        match self {
            FieldValue::Text(s) => vec![s.clone()],
            FieldValue::Number(n) => vec![format_number(*n)],
            FieldValue::List(values) => values.clone(),
            FieldValue::Null => Vec::new(),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Number(_) => 0,
            FieldValue::Text(_) => 1,
            FieldValue::List(_) => 2,
            FieldValue::Null => 3,
        }
    }

    /// The number this value sorts as: every number, and every string [`as_number`]
    /// accepts.
    ///
    /// [`as_number`]: FieldValue::as_number
    fn sort_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => self.as_number(),
            _ => None,
        }
    }

    /// Natural ordering used by the sorter.
    ///
    /// Numbers and numeric strings come first and compare numerically, so `"150"` sorts
    /// before `"1000"`; on equal values a number precedes a string, and strings fall back
    /// to their text. Other strings follow case-sensitively, then lists element-wise,
    /// then null.
    pub fn natural_cmp(&self, other: &FieldValue) -> Ordering {
        match (self.sort_number(), other.sort_number()) {
            (Some(a), Some(b)) => a
                .total_cmp(&b)
                .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
                .then_with(|| match (self, other) {
                    (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
                    _ => Ordering::Equal,
                }),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
                (FieldValue::List(a), FieldValue::List(b)) => a.cmp(b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => f.write_str(&format_number(*n)),
            FieldValue::List(values) => f.write_str(&values.join(",")),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Parses a string holding a finite number, ignoring surrounding whitespace.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Renders a number the way categorical values and search see it: `3` rather than `3.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One catalog row.
///
/// Backed by a `BTreeMap` so serialized output has a stable key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: BTreeMap<String, FieldValue>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy for seed data and tests.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Looks up a field. Explicit nulls are reported as absent.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
