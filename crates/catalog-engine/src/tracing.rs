//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Call it once per process, before the store is spawned.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: `Store started`, `Shutdown` with the final item count
//! - **Writes**: every load, upsert and remove with the collection size afterwards
//! - **Queries**: one `query` span per request carrying the resource name
//!
//! ## Usage Examples
//!
//! ```bash
//! # One line per served page
//! RUST_LOG=info catalog-service inverters "Merk=SMA&sortBy=Prijs"
//!
//! # Also shows the normalized query and every snapshot request
//! RUST_LOG=debug catalog-service inverters "Merk=SMA&sortBy=Prijs"
//! ```
//!
//! With `RUST_LOG=debug` the normalized query is logged once, in full, at the start of
//! the request:
//!
//! ```text
//! DEBUG query: Normalized query=CanonicalQuery { page: 1, limit: 10, search: "", sort_field: "Prijs", .. } resource="inverters"
//! DEBUG query:fetch_all: Sending request resource="inverters"
//! DEBUG Snapshot resource=inverters size=6
//! INFO query: Served page total=3 page=1 returned=3 resource="inverters"
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // spans already name the operation
        .compact()
        .init();
}
