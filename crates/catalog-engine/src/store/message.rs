//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to the
//! [`CatalogStore`](super::CatalogStore) actor. Each carries a one-shot channel for the reply.

use crate::adapter::Snapshot;
use crate::error::StoreError;
use crate::value::{FieldValue, Item};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// One read (`Snapshot`) plus the write path (`Load`, `Upsert`, `Remove`).
///
/// Writes never interleave with a snapshot: the actor handles one request at a time, so
/// a snapshot always reflects every write that arrived before it and none after.
#[derive(Debug)]
pub enum StoreRequest {
    Snapshot {
        resource: String,
        respond_to: Response<Snapshot>,
    },
    /// Replaces a whole collection. Replies with the new size.
    Load {
        resource: String,
        items: Vec<Item>,
        respond_to: Response<usize>,
    },
    /// Replaces the item with the same identifier, or appends it.
    Upsert {
        resource: String,
        item: Item,
        respond_to: Response<()>,
    },
    /// Replies `true` when an item was removed.
    Remove {
        resource: String,
        id: FieldValue,
        respond_to: Response<bool>,
    },
}
