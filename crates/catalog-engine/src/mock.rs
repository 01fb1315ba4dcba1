//! # Mock Store & Testing Guide
//!
//! [`MockStore`] hands out a real [`StoreClient`] whose requests are answered from a queue
//! of scripted expectations instead of a running [`CatalogStore`](crate::CatalogStore).
//! This makes it easy to drive the engine through situations that are hard to reproduce with
//! the real actor, most importantly a failing backend.
//!
//! ## When to use the mock vs the real store
//!
//! | Feature | MockStore | CatalogStore |
//! |---------|-----------|--------------|
//! | **State** | None (scripted replies) | Real collections |
//! | **Error injection** | Easy (`return_err`) | Hard |
//! | **Use case** | Engine behavior around the adapter | Store logic or the full system |
//!
//! ## Example: engine with a failing dependency
//!
//! ```rust
//! use catalog_engine::mock::MockStore;
//! use catalog_engine::{CatalogEngine, EngineError, RawParams, ResourceConfig, ResourceRegistry, StoreError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::new();
//!     mock.expect_snapshot("batteries").return_err(StoreError::StoreClosed);
//!
//!     let registry = ResourceRegistry::new([ResourceConfig::new("batteries", &[], &[], &[])]).unwrap();
//!     let engine = CatalogEngine::new(registry, mock.client());
//!
//!     let result = engine.query("batteries", &RawParams::new()).await;
//!     assert!(matches!(result, Err(EngineError::Dependency(StoreError::StoreClosed))));
//!     mock.verify();
//! }
//! ```
//!
//! ## Channel-level helpers
//!
//! For tests that want to inspect requests themselves, [`create_mock_client`] returns a
//! client plus the raw receiver, and [`expect_snapshot`] pulls the next snapshot request off it.

use crate::adapter::Snapshot;
use crate::error::StoreError;
use crate::store::{StoreClient, StoreRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};

/// A scripted reply, matched against incoming requests in FIFO order.
enum Expectation {
    Snapshot {
        resource: String,
        response: Result<Snapshot, StoreError>,
    },
    Upsert {
        resource: String,
        response: Result<(), StoreError>,
    },
    Remove {
        resource: String,
        response: Result<bool, StoreError>,
    },
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

fn push(expectations: &Expectations, expectation: Expectation) {
    expectations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(expectation);
}

/// A mock store with expectation tracking.
///
/// A request that does not match the next expectation (kind or resource) panics the
/// background task, which drops the reply channel; the caller then sees
/// [`StoreError::StoreDropped`].
pub struct MockStore {
    client: StoreClient,
    expectations: Expectations,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockStore {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest>(100);
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();

                match (request, next) {
                    (
                        StoreRequest::Snapshot {
                            resource,
                            respond_to,
                        },
                        Some(Expectation::Snapshot {
                            resource: expected,
                            response,
                        }),
                    ) if resource == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Upsert {
                            resource,
                            respond_to,
                            ..
                        },
                        Some(Expectation::Upsert {
                            resource: expected,
                            response,
                        }),
                    ) if resource == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Remove {
                            resource,
                            respond_to,
                            ..
                        },
                        Some(Expectation::Remove {
                            resource: expected,
                            response,
                        }),
                    ) if resource == expected => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> StoreClient {
        self.client.clone()
    }

    pub fn expect_snapshot(&mut self, resource: &str) -> SnapshotExpectationBuilder {
        SnapshotExpectationBuilder {
            resource: resource.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_upsert(&mut self, resource: &str) -> UpsertExpectationBuilder {
        UpsertExpectationBuilder {
            resource: resource.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_remove(&mut self, resource: &str) -> RemoveExpectationBuilder {
        RemoveExpectationBuilder {
            resource: resource.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Panics unless every expectation has been consumed.
    pub fn verify(&self) {
        let remaining = self
            .expectations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `snapshot` expectations.
pub struct SnapshotExpectationBuilder {
    resource: String,
    expectations: Expectations,
}

impl SnapshotExpectationBuilder {
    pub fn return_ok(self, items: impl Into<Snapshot>) {
        push(
            &self.expectations,
            Expectation::Snapshot {
                resource: self.resource,
                response: Ok(items.into()),
            },
        );
    }

    pub fn return_err(self, error: StoreError) {
        push(
            &self.expectations,
            Expectation::Snapshot {
                resource: self.resource,
                response: Err(error),
            },
        );
    }
}

/// Builder for `upsert` expectations.
pub struct UpsertExpectationBuilder {
    resource: String,
    expectations: Expectations,
}

impl UpsertExpectationBuilder {
    pub fn return_ok(self) {
        push(
            &self.expectations,
            Expectation::Upsert {
                resource: self.resource,
                response: Ok(()),
            },
        );
    }

    pub fn return_err(self, error: StoreError) {
        push(
            &self.expectations,
            Expectation::Upsert {
                resource: self.resource,
                response: Err(error),
            },
        );
    }
}

/// Builder for `remove` expectations.
pub struct RemoveExpectationBuilder {
    resource: String,
    expectations: Expectations,
}

impl RemoveExpectationBuilder {
    pub fn return_ok(self, removed: bool) {
        push(
            &self.expectations,
            Expectation::Remove {
                resource: self.resource,
                response: Ok(removed),
            },
        );
    }

    pub fn return_err(self, error: StoreError) {
        push(
            &self.expectations,
            Expectation::Remove {
                resource: self.resource,
                response: Err(error),
            },
        );
    }
}

/// Creates a client whose requests land on the returned receiver.
pub fn create_mock_client(buffer_size: usize) -> (StoreClient, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Pulls the next request off `receiver`, if it is a snapshot request.
pub async fn expect_snapshot(
    receiver: &mut mpsc::Receiver<StoreRequest>,
) -> Option<(String, oneshot::Sender<Result<Snapshot, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Snapshot {
            resource,
            respond_to,
        }) => Some((resource, respond_to)),
        _ => None,
    }
}
