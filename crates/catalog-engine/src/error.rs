//! # Engine Errors
//!
//! The engine surfaces exactly two failure kinds to its callers: an unknown resource
//! ([`EngineError::NotFound`]) and a failing Resource Adapter ([`EngineError::Dependency`]).
//! Malformed input is never an error; the normalizer degrades it to defaults.

use serde::Serialize;

/// Errors raised by a Resource Adapter while producing an item snapshot or applying a write.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
    #[error("Invalid item: {0}")]
    InvalidItem(String),
    #[error("Backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by [`CatalogEngine::query`](crate::CatalogEngine::query).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The resource name is not in the registry. Callers map this to a 4xx response.
    #[error("Unknown resource: {0}")]
    NotFound(String),

    /// The item collection could not be fetched. Callers map this to a 5xx response.
    #[error("Dependency failure: {0}")]
    Dependency(#[from] StoreError),
}

impl EngineError {
    /// HTTP status a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::NotFound(_) => 404,
            EngineError::Dependency(_) => 503,
        }
    }

    /// Renders the single-object failure body: `{ "error": ..., "message": ... }`.
    pub fn to_body(&self) -> ErrorBody {
        let error = match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::Dependency(_) => "dependency_failure",
        };
        ErrorBody {
            error: error.to_string(),
            message: self.to_string(),
        }
    }
}

/// JSON failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_map_to_status_codes() {
        let missing = EngineError::NotFound("heat-pumps".into());
        assert_eq!(missing.status_code(), 404);

        let down = EngineError::from(StoreError::StoreClosed);
        assert_eq!(down.status_code(), 503);
    }

    #[test]
    fn test_error_body_carries_cause() {
        let err = EngineError::from(StoreError::Backend(Box::new(std::io::Error::other(
            "connection refused",
        ))));
        let body = err.to_body();
        assert_eq!(body.error, "dependency_failure");
        assert!(body.message.contains("connection refused"));

        let json = serde_json::to_string(&EngineError::NotFound("x".into()).to_body()).unwrap();
        assert_eq!(json, r#"{"error":"not_found","message":"Unknown resource: x"}"#);
    }
}
