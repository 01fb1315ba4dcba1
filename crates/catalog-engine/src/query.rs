//! # Query Normalizer
//!
//! Turns raw request parameters into a [`CanonicalQuery`]. Normalization never fails:
//! anything malformed degrades to a default, and parameters that do not name a declared
//! field are ignored.

use crate::config::ResourceConfig;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Raw query-string parameters. When a key repeats, the last value wins.
pub type RawParams = BTreeMap<String, String>;

/// Collects key/value pairs (e.g. from `url::form_urlencoded::parse`) into [`RawParams`].
pub fn raw_params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> RawParams
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Inclusive bounds for one range field. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeBounds {
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// The request after normalization. Built fresh per request.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalQuery {
    pub page: usize,
    pub limit: usize,
    pub search: String,
    pub sort_field: String,
    pub sort_order: SortOrder,
    /// Field → non-empty set of selected values. Only declared filterable fields appear.
    pub categorical_filters: BTreeMap<String, BTreeSet<String>>,
    /// Field → bounds with at least one side set. Only declared range fields appear.
    pub range_filters: BTreeMap<String, RangeBounds>,
}

impl CanonicalQuery {
    /// An unfiltered first page sorted by the identifier field.
    pub fn unfiltered(config: &ResourceConfig) -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            sort_field: config.id_field.clone(),
            sort_order: SortOrder::Asc,
            categorical_filters: BTreeMap::new(),
            range_filters: BTreeMap::new(),
        }
    }

    pub fn normalize(params: &RawParams, config: &ResourceConfig) -> Self {
        let param = |key: &str| params.get(key).map(String::as_str);

        let sort_field = param("sortBy")
            .filter(|field| config.is_sortable(field))
            .unwrap_or(&config.id_field)
            .to_string();

        let categorical_filters = config
            .filterable_fields
            .iter()
            .filter_map(|field| {
                let selected = split_selection(param(field.as_str())?);
                (!selected.is_empty()).then(|| (field.clone(), selected))
            })
            .collect();

        let range_filters = config
            .range_fields
            .iter()
            .filter_map(|field| {
                let bounds = RangeBounds {
                    min: param(format!("{field}_min").as_str()).and_then(parse_bound),
                    max: param(format!("{field}_max").as_str()).and_then(parse_bound),
                };
                (bounds.min.is_some() || bounds.max.is_some()).then(|| (field.clone(), bounds))
            })
            .collect();

        Self {
            page: parse_positive(param("page")).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(param("limit")).unwrap_or(DEFAULT_LIMIT),
            search: param("search").unwrap_or_default().to_string(),
            sort_field,
            sort_order: SortOrder::parse(param("sortOrder")),
            categorical_filters,
            range_filters,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok().filter(|n| *n >= 1)
}

fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn split_selection(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
