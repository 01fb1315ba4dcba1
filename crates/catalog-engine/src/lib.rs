//! # Catalog Engine
//!
//! A generic query and faceting engine for product catalogs. Every catalog resource
//! (indoor units, inverters, batteries, ...) is served by the same code path: a declarative
//! [`ResourceConfig`] plus a client query go in, a page of items plus facet metadata come out.
//!
//! ## Pipeline
//!
//! 1. **Field Classifier** ([`ResourceConfig`]): which fields are searchable, filterable
//!    and range-filterable. Pure data, loaded once into a [`ResourceRegistry`].
//! 2. **Query Normalizer** ([`CanonicalQuery::normalize`]): raw string parameters into a
//!    canonical query. Never fails; malformed input degrades to defaults.
//! 3. **Predicate Builder** ([`Predicate::build`]): search OR-group AND one OR-group per
//!    categorical field AND one inclusive range per range field.
//! 4. **Facet Calculator** ([`facet::compute`]): leave-one-out facets, independent of paging.
//! 5. **Paginator/Sorter** ([`page::paginate`]): deterministic sort with identifier
//!    tie-break, then one page.
//!
//! The only resource-specific piece is the [`ResourceAdapter`] that hands the engine an item
//! snapshot. [`CatalogStore`] is an in-memory, actor-backed adapter that also owns the write
//! path.
//!
//! ## Concurrency Model
//!
//! - The engine is stateless per request; share one [`CatalogEngine`] across tasks freely
//! - The adapter is awaited once per request, the rest runs synchronously on the snapshot
//! - The store actor processes requests sequentially in its own Tokio task (no locks)
//!
//! ## Errors
//!
//! [`CatalogEngine::query`] fails with exactly two kinds: [`EngineError::NotFound`] for an
//! unregistered resource and [`EngineError::Dependency`] for a failing adapter.
//!
//! ## Testing
//!
//! The [`mock`] module provides a scripted [`MockStore`](mock::MockStore) to drive the engine
//! through adapter failures without a running store.

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod facet;
pub mod mock;
pub mod page;
pub mod predicate;
pub mod query;
pub mod response;
pub mod store;
pub mod tracing;
pub mod value;

// Re-export core types for convenience
pub use adapter::{ResourceAdapter, Snapshot};
pub use config::{ConfigError, ResourceConfig, ResourceRegistry, SelectKind};
pub use engine::{evaluate, CatalogEngine, QueryOutcome};
pub use error::{EngineError, ErrorBody, StoreError};
pub use facet::{FacetCount, FacetSet, FacetValue, RangeFacet};
pub use page::PageResult;
pub use predicate::Predicate;
pub use query::{raw_params, CanonicalQuery, RangeBounds, RawParams, SortOrder};
pub use response::{FacetDescriptor, Pagination, QueryResponse};
pub use store::{CatalogStore, StoreClient};
pub use value::{FieldValue, Item};
