//! # Catalog Service
//!
//! Runs the [`catalog_engine`] over the five bundled catalog resources: indoor units,
//! outdoor units, inverters, solar panels and batteries.
//!
//! - **[lifecycle]**: starts the store actor, seeds it and builds the engine
//! - **[resources]**: bundled registry and seed data, overridable from the environment
//! - **[query_string]**: URL query strings into engine parameters
//!
//! The binary answers one query per invocation:
//!
//! ```bash
//! catalog-service inverters "Fasen=1&sortBy=Prijs&sortOrder=desc"
//! ```

pub mod error;
pub mod lifecycle;
pub mod query_string;
pub mod resources;

pub use error::ServiceError;
pub use lifecycle::CatalogSystem;
