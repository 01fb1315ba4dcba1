//! # Response Body
//!
//! The JSON shape every resource endpoint answers with:
//!
//! ```text
//! {
//!   "data": [ Item, ... ],
//!   "pagination": { "page", "limit", "total", "totalPages" },
//!   "filterOptions":  { field: [ value, ... ] },
//!   "filterMetadata": { field: { "type": "select" | "multiselect" | "range", ... } }
//! }
//! ```

use crate::config::{ResourceConfig, SelectKind};
use crate::facet::{FacetCount, FacetSet, FacetValue};
use crate::page::PageResult;
use crate::value::Item;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Describes how a client should render one filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FacetDescriptor {
    Select {
        options: Vec<FacetValue>,
        #[serde(rename = "optionsWithCounts")]
        options_with_counts: Vec<FacetCount>,
    },
    Multiselect {
        options: Vec<FacetValue>,
        #[serde(rename = "optionsWithCounts")]
        options_with_counts: Vec<FacetCount>,
    },
    Range { min: f64, max: f64, step: f64 },
}

impl FacetDescriptor {
    fn categorical(kind: SelectKind, counts: &[FacetCount]) -> Self {
        let options = counts.iter().map(|c| c.value.clone()).collect();
        let options_with_counts = counts.to_vec();
        match kind {
            SelectKind::Select => FacetDescriptor::Select {
                options,
                options_with_counts,
            },
            SelectKind::Multiselect => FacetDescriptor::Multiselect {
                options,
                options_with_counts,
            },
        }
    }
}

/// Combined page + facets answer of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub data: Vec<Item>,
    pub pagination: Pagination,
    pub filter_options: BTreeMap<String, Vec<FacetValue>>,
    pub filter_metadata: BTreeMap<String, FacetDescriptor>,
}

impl QueryResponse {
    pub fn assemble(page: PageResult, facets: &FacetSet, config: &ResourceConfig) -> Self {
        let mut filter_options = BTreeMap::new();
        let mut filter_metadata = BTreeMap::new();

        for (field, counts) in &facets.categorical {
            filter_options.insert(
                field.clone(),
                counts.iter().map(|c| c.value.clone()).collect(),
            );
            filter_metadata.insert(
                field.clone(),
                FacetDescriptor::categorical(config.select_kind(field), counts),
            );
        }
        for (field, range) in &facets.ranges {
            filter_metadata.insert(
                field.clone(),
                FacetDescriptor::Range {
                    min: range.min,
                    max: range.max,
                    step: config.range_step(field),
                },
            );
        }

        Self {
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
            data: page.items,
            filter_options,
            filter_metadata,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
