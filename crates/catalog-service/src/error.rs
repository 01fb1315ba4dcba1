use catalog_engine::{ConfigError, EngineError, StoreError};
use std::path::PathBuf;

/// Everything that can stop the service from starting, serving or shutting down.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Resource configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read seed data {path}: {source}")]
    SeedIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed seed data: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("Seed data for unregistered resource: {0}")]
    UnknownSeedResource(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Store task failed: {0}")]
    Shutdown(#[from] tokio::task::JoinError),
}
