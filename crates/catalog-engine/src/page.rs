//! # Paginator & Sorter
//!
//! Applies the full predicate, sorts deterministically and slices out one page.
//!
//! Sorting uses the field's natural ordering (see [`FieldValue::natural_cmp`]) and always
//! breaks ties on the identifier field, ascending, so repeated identical requests page
//! through exactly the same sequence.

use crate::predicate::Predicate;
use crate::query::{CanonicalQuery, SortOrder};
use crate::value::{FieldValue, Item};
use serde::Serialize;
use std::cmp::Ordering;

/// One page of matching items plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub items: Vec<Item>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Compares two optional values; absent values go last regardless of direction.
fn compare_present(a: Option<&FieldValue>, b: Option<&FieldValue>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.natural_cmp(b),
            SortOrder::Desc => b.natural_cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts `items` in place by `sort_field`/`order`, tie-breaking on `id_field` ascending.
pub fn sort_items(items: &mut [&Item], sort_field: &str, order: SortOrder, id_field: &str) {
    items.sort_by(|a, b| {
        compare_present(a.get(sort_field), b.get(sort_field), order).then_with(|| {
            compare_present(a.get(id_field), b.get(id_field), SortOrder::Asc)
        })
    });
}

/// Number of pages needed for `total` items; `0` when there are none.
pub fn total_pages(total: usize, limit: usize) -> usize {
    total.div_ceil(limit.max(1))
}

/// Filters, sorts and slices the snapshot according to `query`.
pub fn paginate(
    items: &[Item],
    predicate: &Predicate,
    query: &CanonicalQuery,
    id_field: &str,
) -> PageResult {
    let mut matching: Vec<&Item> = items.iter().filter(|item| predicate.matches(item)).collect();
    sort_items(&mut matching, &query.sort_field, query.sort_order, id_field);

    let total = matching.len();
    let limit = query.limit.max(1);
    let page = query.page.max(1);
    let start = (page - 1).saturating_mul(limit);

    let items = matching
        .into_iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect();

    PageResult {
        items,
        page,
        limit,
        total,
        total_pages: total_pages(total, limit),
    }
}
