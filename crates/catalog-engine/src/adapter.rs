//! # Resource Adapter
//!
//! The one seam where the engine awaits: fetching the item collection of a resource. An
//! adapter must hand out a *consistent* snapshot per call; the engine fetches it once per
//! request and reuses it for both facets and pagination.

use crate::error::StoreError;
use crate::value::Item;
use async_trait::async_trait;
use std::sync::Arc;

/// An immutable, cheaply cloneable item collection.
pub type Snapshot = Arc<Vec<Item>>;

/// Source of item snapshots, keyed by resource name.
///
/// # Example
///
/// ```rust
/// use catalog_engine::{Item, ResourceAdapter, Snapshot, StoreError};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Fixed(Snapshot);
///
/// #[async_trait]
/// impl ResourceAdapter for Fixed {
///     async fn fetch_all(&self, resource: &str) -> Result<Snapshot, StoreError> {
///         match resource {
///             "batteries" => Ok(self.0.clone()),
///             other => Err(StoreError::UnknownCollection(other.to_string())),
///         }
///     }
/// }
///
/// let _adapter = Fixed(Arc::new(vec![Item::new().with("id", 1)]));
/// ```
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    async fn fetch_all(&self, resource: &str) -> Result<Snapshot, StoreError>;
}

#[async_trait]
impl<A: ResourceAdapter + ?Sized> ResourceAdapter for Arc<A> {
    async fn fetch_all(&self, resource: &str) -> Result<Snapshot, StoreError> {
        (**self).fetch_all(resource).await
    }
}
