//! # Catalog Engine
//!
//! The one operation callers see: `query(resource, params)`.
//!
//! ```text
//! params ──► normalize ──► Predicate::build ──┬──► paginate ──► PageResult
//!                                             └──► facet::compute ──► FacetSet
//! ```
//!
//! The adapter is awaited exactly once per request; everything after that is synchronous
//! work over the returned snapshot, so both the page and the facets see the same items.

use crate::adapter::ResourceAdapter;
use crate::config::{ResourceConfig, ResourceRegistry};
use crate::error::EngineError;
use crate::facet::{self, FacetSet};
use crate::page::{self, PageResult};
use crate::predicate::Predicate;
use crate::query::{CanonicalQuery, RawParams};
use crate::response::QueryResponse;
use crate::value::Item;
use tracing::{debug, info, instrument, warn};

/// The page and facets of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub page: PageResult,
    pub facets: FacetSet,
}

/// Runs one already-normalized query against a snapshot.
///
/// Pure: the same inputs always give the same outcome.
pub fn evaluate(config: &ResourceConfig, query: &CanonicalQuery, items: &[Item]) -> QueryOutcome {
    let predicate = Predicate::build(query, config);
    let page = page::paginate(items, &predicate, query, &config.id_field);
    let facets = facet::compute(items, &predicate, config);
    QueryOutcome { page, facets }
}

/// Resource-agnostic query engine over a [`ResourceRegistry`] and a [`ResourceAdapter`].
///
/// Holds no mutable state, so one instance can serve any number of concurrent requests.
///
/// ```rust
/// use catalog_engine::{raw_params, CatalogEngine, CatalogStore, Item, ResourceConfig, ResourceRegistry};
///
/// #[tokio::main]
/// async fn main() {
///     let registry = ResourceRegistry::new([ResourceConfig::new("batteries", &["Merk"], &["Merk"], &["Capaciteit (kWh)"])]).unwrap();
///     let (store, client) = CatalogStore::new(16, &registry);
///     tokio::spawn(store.run());
///     client
///         .load("batteries", vec![
///             Item::new().with("id", 1).with("Merk", "BYD").with("Capaciteit (kWh)", 5.1),
///             Item::new().with("id", 2).with("Merk", "Sessy").with("Capaciteit (kWh)", 5.0),
///         ])
///         .await
///         .unwrap();
///
///     let engine = CatalogEngine::new(registry, client);
///     let outcome = engine.query("batteries", &raw_params([("search", "sessy")])).await.unwrap();
///     assert_eq!(outcome.page.total, 1);
///     assert_eq!(outcome.facets.count("Merk", "BYD"), 0);
/// }
/// ```
pub struct CatalogEngine<A> {
    registry: ResourceRegistry,
    adapter: A,
}

impl<A: ResourceAdapter> CatalogEngine<A> {
    pub fn new(registry: ResourceRegistry, adapter: A) -> Self {
        Self { registry, adapter }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Answers one request for `resource`.
    ///
    /// Fails only with [`EngineError::NotFound`] (resource not registered) or
    /// [`EngineError::Dependency`] (the adapter failed). Malformed parameters never fail.
    #[instrument(skip(self, params))]
    pub async fn query(
        &self,
        resource: &str,
        params: &RawParams,
    ) -> Result<QueryOutcome, EngineError> {
        let Some(config) = self.registry.get(resource) else {
            let e = EngineError::NotFound(resource.to_string());
            warn!(error = %e, "Query rejected");
            return Err(e);
        };

        let query = CanonicalQuery::normalize(params, config);
        debug!(?query, "Normalized");

        let items = self.adapter.fetch_all(resource).await.map_err(|e| {
            let e = EngineError::from(e);
            warn!(error = %e, "Query failed");
            e
        })?;

        let outcome = evaluate(config, &query, &items);
        info!(
            total = outcome.page.total,
            page = outcome.page.page,
            returned = outcome.page.items.len(),
            "Served page"
        );
        Ok(outcome)
    }

    /// Like [`query`](Self::query), assembled into the JSON response body.
    pub async fn respond(
        &self,
        resource: &str,
        params: &RawParams,
    ) -> Result<QueryResponse, EngineError> {
        let outcome = self.query(resource, params).await?;
        let config = self
            .registry
            .get(resource)
            .ok_or_else(|| EngineError::NotFound(resource.to_string()))?;
        Ok(QueryResponse::assemble(outcome.page, &outcome.facets, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::facet::RangeFacet;
    use crate::mock::MockStore;
    use crate::query::raw_params;
    use crate::value::FieldValue;

    fn config() -> ResourceConfig {
        ResourceConfig::new("outdoor-units", &["Merk"], &["Merk"], &["Prijs"])
    }

    fn five_items() -> Vec<Item> {
        [(100, "A"), (200, "A"), (300, "B"), (400, "B"), (500, "C")]
            .into_iter()
            .enumerate()
            .map(|(i, (prijs, merk))| {
                Item::new()
                    .with("id", i as i64 + 1)
                    .with("Prijs", prijs)
                    .with("Merk", merk)
            })
            .collect()
    }

    fn ids(page: &PageResult) -> Vec<f64> {
        page.items
            .iter()
            .filter_map(|item| item.get("id").and_then(FieldValue::as_number))
            .collect()
    }

    fn engine_with(mock: &MockStore) -> CatalogEngine<crate::StoreClient> {
        let registry = ResourceRegistry::new([config()]).unwrap();
        CatalogEngine::new(registry, mock.client())
    }

    #[test]
    fn test_filters_narrow_page_and_other_facets() {
        let query = CanonicalQuery::normalize(
            &raw_params([("Merk", "A"), ("Prijs_min", "150")]),
            &config(),
        );
        let outcome = evaluate(&config(), &query, &five_items());

        assert_eq!(outcome.page.total, 1);
        assert_eq!(ids(&outcome.page), vec![2.0]);

        assert_eq!(
            outcome.facets.ranges["Prijs"],
            RangeFacet {
                min: 100.0,
                max: 200.0
            }
        );
        assert_eq!(outcome.facets.count("Merk", "A"), 1);
        assert_eq!(outcome.facets.count("Merk", "B"), 2);
        assert_eq!(outcome.facets.count("Merk", "C"), 1);
    }

    #[test]
    fn test_second_page_of_two() {
        let query = CanonicalQuery::normalize(
            &raw_params([("page", "2"), ("limit", "2")]),
            &config(),
        );
        let outcome = evaluate(&config(), &query, &five_items());

        assert_eq!(ids(&outcome.page), vec![3.0, 4.0]);
        assert_eq!(outcome.page.total_pages, 3);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let query = CanonicalQuery::normalize(
            &raw_params([("page", "10"), ("limit", "10")]),
            &config(),
        );
        let outcome = evaluate(&config(), &query, &five_items());

        assert!(outcome.page.items.is_empty());
        assert_eq!(outcome.page.total, 5);
        assert_eq!(outcome.page.total_pages, 1);
    }

    #[test]
    fn test_empty_collection_degrades() {
        let query = CanonicalQuery::unfiltered(&config());
        let outcome = evaluate(&config(), &query, &[]);

        assert_eq!(outcome.page.total, 0);
        assert_eq!(outcome.page.total_pages, 0);
        assert!(outcome.facets.categorical["Merk"].is_empty());
        assert_eq!(outcome.facets.ranges["Prijs"], RangeFacet::default());
    }

    #[tokio::test]
    async fn test_query_fetches_snapshot_once() {
        let mut mock = MockStore::new();
        mock.expect_snapshot("outdoor-units").return_ok(five_items());
        let engine = engine_with(&mock);

        let outcome = engine
            .query("outdoor-units", &raw_params([("Merk", "B,C")]))
            .await
            .unwrap();

        assert_eq!(outcome.page.total, 3);
        assert_eq!(outcome.facets.count("Merk", "A"), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn test_unknown_resource_is_not_found() {
        let mock = MockStore::new();
        let engine = engine_with(&mock);

        let result = engine.query("heat-pumps", &RawParams::new()).await;

        let err = result.unwrap_err();
        assert!(matches!(&err, EngineError::NotFound(name) if name == "heat-pumps"));
        assert_eq!(err.status_code(), 404);
        // No expectation was set, so the store must not have been asked.
        mock.verify();
    }

    #[tokio::test]
    async fn test_adapter_failure_is_dependency_failure() {
        let mut mock = MockStore::new();
        mock.expect_snapshot("outdoor-units")
            .return_err(StoreError::Backend("connection refused".into()));
        let engine = engine_with(&mock);

        let err = engine
            .respond("outdoor-units", &RawParams::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Dependency(StoreError::Backend(_))));
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_body().error, "dependency_failure");
        mock.verify();
    }

    #[tokio::test]
    async fn test_respond_builds_response_body() {
        let mut mock = MockStore::new();
        mock.expect_snapshot("outdoor-units").return_ok(five_items());
        let engine = engine_with(&mock);

        let response = engine
            .respond("outdoor-units", &raw_params([("limit", "2"), ("sortBy", "Prijs"), ("sortOrder", "desc")]))
            .await
            .unwrap();

        assert_eq!(response.pagination.total, 5);
        assert_eq!(response.pagination.total_pages, 3);
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].get("Prijs"), Some(&FieldValue::Number(500.0)));
        assert_eq!(response.filter_options["Merk"].len(), 3);
        mock.verify();
    }
}
