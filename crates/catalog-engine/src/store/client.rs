//! # Store Client
//!
//! Cloneable handle to a running [`CatalogStore`](super::CatalogStore). Implements
//! [`ResourceAdapter`] so it can be handed straight to a
//! [`CatalogEngine`](crate::CatalogEngine).

use super::message::StoreRequest;
use crate::adapter::{ResourceAdapter, Snapshot};
use crate::error::StoreError;
use crate::value::{FieldValue, Item};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for the store actor. Holds only a sender, so cloning is cheap.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn snapshot(&self, resource: &str) -> Result<Snapshot, StoreError> {
        let resource = resource.to_string();
        self.request(|respond_to| StoreRequest::Snapshot {
            resource,
            respond_to,
        })
        .await
    }

    /// Replaces the whole collection of `resource`; returns its new size.
    pub async fn load(&self, resource: &str, items: Vec<Item>) -> Result<usize, StoreError> {
        let resource = resource.to_string();
        self.request(|respond_to| StoreRequest::Load {
            resource,
            items,
            respond_to,
        })
        .await
    }

    pub async fn upsert(&self, resource: &str, item: Item) -> Result<(), StoreError> {
        let resource = resource.to_string();
        self.request(|respond_to| StoreRequest::Upsert {
            resource,
            item,
            respond_to,
        })
        .await
    }

    pub async fn remove(
        &self,
        resource: &str,
        id: impl Into<FieldValue>,
    ) -> Result<bool, StoreError> {
        let resource = resource.to_string();
        let id = id.into();
        self.request(|respond_to| StoreRequest::Remove {
            resource,
            id,
            respond_to,
        })
        .await
    }
}

#[async_trait]
impl ResourceAdapter for StoreClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self, resource: &str) -> Result<Snapshot, StoreError> {
        tracing::debug!("Sending request");
        self.snapshot(resource).await
    }
}
