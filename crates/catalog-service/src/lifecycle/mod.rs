//! # System Lifecycle
//!
//! [`CatalogSystem`] wires the running service together:
//!
//! 1. **Load** the resource registry and the seed items
//! 2. **Spawn** the [`CatalogStore`] actor with one collection per resource
//! 3. **Seed** every collection through the store's write path
//! 4. **Serve** queries through a [`CatalogEngine`] that reads snapshots from the store
//!
//! ## Graceful Shutdown
//!
//! The store stops when the last [`StoreClient`] is dropped. The engine holds a client too,
//! so [`CatalogSystem::shutdown`] drops both before awaiting the store task:
//!
//! ```rust,ignore
//! let system = CatalogSystem::from_env().await?;
//! let response = system.engine.respond("batteries", &params).await?;
//! system.shutdown().await?;
//! ```

use crate::error::ServiceError;
use crate::resources::{self, Seed};
use catalog_engine::{CatalogEngine, CatalogStore, ResourceRegistry, StoreClient};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

const STORE_BUFFER: usize = 64;

pub struct CatalogSystem {
    /// Serves queries for every registered resource.
    pub engine: CatalogEngine<StoreClient>,

    /// The external write path into the store.
    pub store_client: StoreClient,

    handle: JoinHandle<()>,
}

impl CatalogSystem {
    /// Starts the store, loads `seed` into it and builds the engine.
    ///
    /// Seed entries for resources missing from `registry` are rejected; registered resources
    /// without seed entries start empty.
    pub async fn start(registry: ResourceRegistry, seed: Seed) -> Result<Self, ServiceError> {
        if let Some(unknown) = seed.keys().find(|name| registry.get(name).is_none()) {
            return Err(ServiceError::UnknownSeedResource(unknown.clone()));
        }

        let (store, store_client) = CatalogStore::new(STORE_BUFFER, &registry);
        let handle = tokio::spawn(store.run());

        for (resource, items) in seed {
            if let Err(e) = store_client.load(&resource, items).await {
                error!(%resource, error = %e, "Seeding failed");
                drop(store_client);
                // The seeding error is the one returned; `join_store` logs a store failure.
                let _ = join_store(handle).await;
                return Err(e.into());
            }
        }

        info!(resources = registry.len(), "Catalog system started");
        Ok(Self {
            engine: CatalogEngine::new(registry, store_client.clone()),
            store_client,
            handle,
        })
    }

    /// Starts with the registry and seed named by the environment, or the bundled ones.
    pub async fn from_env() -> Result<Self, ServiceError> {
        let registry = resources::registry_from_env()?;
        let seed = resources::seed_from_env()?;
        Self::start(registry, seed).await
    }

    /// Closes the store channel and waits for the store task to finish.
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        info!("Shutting down catalog system");

        drop(self.engine);
        drop(self.store_client);

        join_store(self.handle).await?;

        info!("Catalog system shutdown complete");
        Ok(())
    }
}

/// Waits for the store task to finish, logging a panic or cancellation.
async fn join_store(handle: JoinHandle<()>) -> Result<(), JoinError> {
    handle
        .await
        .inspect_err(|e| error!(error = %e, "Store task failed"))
}
