//! # In-Memory Catalog Store
//!
//! `CatalogStore` is an actor that owns the item collections of every resource. It runs in
//! its own Tokio task and processes [`StoreRequest`]s sequentially, so the collections need
//! no locks, and a snapshot can never observe a half-applied write.
//!
//! Collections are held as `Arc<Vec<Item>>`. A snapshot clones the `Arc`; a write goes
//! through `Arc::make_mut`, which copies the vector only while an older snapshot is still
//! in use by some request.

use super::client::StoreClient;
use super::message::StoreRequest;
use crate::adapter::Snapshot;
use crate::config::ResourceRegistry;
use crate::error::StoreError;
use crate::value::{FieldValue, Item};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct Collection {
    id_field: String,
    items: Snapshot,
}

impl Collection {
    fn id_of<'a>(&self, item: &'a Item) -> Result<&'a FieldValue, StoreError> {
        item.get(&self.id_field).ok_or_else(|| {
            StoreError::InvalidItem(format!("missing identifier field {:?}", self.id_field))
        })
    }

    fn load(&mut self, items: Vec<Item>) -> Result<usize, StoreError> {
        for item in &items {
            self.id_of(item)?;
        }
        self.items = Arc::new(items);
        Ok(self.items.len())
    }

    fn upsert(&mut self, item: Item) -> Result<(), StoreError> {
        let id = self.id_of(&item)?.clone();
        let id_field = &self.id_field;
        let items = Arc::make_mut(&mut self.items);
        match items.iter_mut().find(|existing| existing.get(id_field) == Some(&id)) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }

    fn remove(&mut self, id: &FieldValue) -> bool {
        let id_field = &self.id_field;
        let Some(position) = self.items.iter().position(|i| i.get(id_field) == Some(id)) else {
            return false;
        };
        Arc::make_mut(&mut self.items).remove(position);
        true
    }
}

/// The actor owning every resource's items.
///
/// # Usage Pattern
///
/// 1.  **Create**: `CatalogStore::new()` returns the actor and a cloneable [`StoreClient`].
/// 2.  **Run**: spawn `store.run()` on the Tokio runtime.
/// 3.  **Use**: hand the client to a [`CatalogEngine`](crate::CatalogEngine) as its adapter,
///     and to whatever owns the write path.
///
/// ```rust
/// use catalog_engine::{CatalogStore, Item, ResourceAdapter, ResourceConfig, ResourceRegistry};
///
/// #[tokio::main]
/// async fn main() {
///     let registry = ResourceRegistry::new([ResourceConfig::new("batteries", &[], &[], &[])]).unwrap();
///     let (store, client) = CatalogStore::new(16, &registry);
///     tokio::spawn(store.run());
///
///     client.upsert("batteries", Item::new().with("id", 1)).await.unwrap();
///     let snapshot = client.fetch_all("batteries").await.unwrap();
///     assert_eq!(snapshot.len(), 1);
/// }
/// ```
pub struct CatalogStore {
    receiver: mpsc::Receiver<StoreRequest>,
    collections: HashMap<String, Collection>,
}

impl CatalogStore {
    /// Creates an empty collection for every resource in `registry`.
    ///
    /// `buffer_size` is the capacity of the request channel; clients wait when it is full.
    pub fn new(buffer_size: usize, registry: &ResourceRegistry) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let collections = registry
            .iter()
            .map(|config| {
                let collection = Collection {
                    id_field: config.id_field.clone(),
                    items: Arc::new(Vec::new()),
                };
                (config.name.clone(), collection)
            })
            .collect();
        let store = Self {
            receiver,
            collections,
        };
        (store, StoreClient::new(sender))
    }

    fn collection_mut(&mut self, resource: &str) -> Result<&mut Collection, StoreError> {
        self.collections
            .get_mut(resource)
            .ok_or_else(|| StoreError::UnknownCollection(resource.to_string()))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!(collections = self.collections.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Snapshot {
                    resource,
                    respond_to,
                } => {
                    let result = self
                        .collection_mut(&resource)
                        .map(|collection| collection.items.clone());
                    match &result {
                        Ok(items) => debug!(%resource, size = items.len(), "Snapshot"),
                        Err(e) => warn!(%resource, error = %e, "Snapshot failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Load {
                    resource,
                    items,
                    respond_to,
                } => {
                    let result = self
                        .collection_mut(&resource)
                        .and_then(|collection| collection.load(items));
                    match &result {
                        Ok(size) => info!(%resource, size, "Loaded"),
                        Err(e) => warn!(%resource, error = %e, "Load rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Upsert {
                    resource,
                    item,
                    respond_to,
                } => {
                    debug!(%resource, ?item, "Upsert");
                    let result = self.collection_mut(&resource).and_then(|collection| {
                        collection.upsert(item)?;
                        Ok(collection.items.len())
                    });
                    let result = match result {
                        Ok(size) => {
                            info!(%resource, size, "Upserted");
                            Ok(())
                        }
                        Err(e) => {
                            warn!(%resource, error = %e, "Upsert rejected");
                            Err(e)
                        }
                    };
                    let _ = respond_to.send(result);
                }
                StoreRequest::Remove {
                    resource,
                    id,
                    respond_to,
                } => {
                    let result = self.collection_mut(&resource).map(|collection| {
                        let removed = collection.remove(&id);
                        (removed, collection.items.len())
                    });
                    let result = match result {
                        Ok((removed, size)) => {
                            info!(%resource, %id, removed, size, "Removed");
                            Ok(removed)
                        }
                        Err(e) => {
                            warn!(%resource, %id, error = %e, "Remove failed");
                            Err(e)
                        }
                    };
                    let _ = respond_to.send(result);
                }
            }
        }

        let items: usize = self.collections.values().map(|c| c.items.len()).sum();
        info!(collections = self.collections.len(), items, "Shutdown");
    }
}
