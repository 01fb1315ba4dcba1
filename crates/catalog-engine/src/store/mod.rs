//! In-memory, actor-backed [`ResourceAdapter`](crate::ResourceAdapter): the
//! [`CatalogStore`] actor owns the collections, the [`StoreClient`] talks to it.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::CatalogStore;
pub use client::StoreClient;
pub use message::{Response, StoreRequest};
