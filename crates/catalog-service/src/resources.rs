//! # Bundled Resources
//!
//! The registry and the seed items the service starts with. Both are compiled in, and both
//! can be replaced at run time:
//!
//! | Variable | Default | Format |
//! |----------|---------|--------|
//! | `CATALOG_RESOURCES` | `resources.toml` | one `[[resource]]` table per resource |
//! | `CATALOG_SEED` | `data/catalog.json` | `{ "<resource>": [ item, ... ] }` |

use crate::error::ServiceError;
use catalog_engine::{Item, ResourceRegistry};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub const RESOURCES_ENV: &str = "CATALOG_RESOURCES";
pub const SEED_ENV: &str = "CATALOG_SEED";

const BUNDLED_RESOURCES: &str = include_str!("../resources.toml");
const BUNDLED_SEED: &str = include_str!("../data/catalog.json");

/// Initial items, keyed by resource name.
pub type Seed = BTreeMap<String, Vec<Item>>;

pub fn bundled_registry() -> Result<ResourceRegistry, ServiceError> {
    Ok(ResourceRegistry::from_toml_str(BUNDLED_RESOURCES)?)
}

pub fn bundled_seed() -> Result<Seed, ServiceError> {
    parse_seed(BUNDLED_SEED)
}

pub fn parse_seed(content: &str) -> Result<Seed, ServiceError> {
    Ok(serde_json::from_str(content)?)
}

pub fn seed_from_path(path: impl AsRef<Path>) -> Result<Seed, ServiceError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ServiceError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&content)
}

/// Registry from `CATALOG_RESOURCES`, or the bundled one.
pub fn registry_from_env() -> Result<ResourceRegistry, ServiceError> {
    match std::env::var_os(RESOURCES_ENV) {
        Some(path) => {
            info!(path = %Path::new(&path).display(), "Loading resource configuration");
            Ok(ResourceRegistry::from_path(path)?)
        }
        None => bundled_registry(),
    }
}

/// Seed from `CATALOG_SEED`, or the bundled one.
pub fn seed_from_env() -> Result<Seed, ServiceError> {
    match std::env::var_os(SEED_ENV) {
        Some(path) => {
            info!(path = %Path::new(&path).display(), "Loading seed data");
            seed_from_path(path)
        }
        None => bundled_seed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_engine::SelectKind;

    #[test]
    fn test_bundled_registry_declares_every_resource() {
        let registry = bundled_registry().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec!["batteries", "indoor-units", "inverters", "outdoor-units", "solar-panels"]
        );

        let inverters = registry.get("inverters").unwrap();
        assert_eq!(inverters.id_field, "sku");
        let indoor = registry.get("indoor-units").unwrap();
        assert_eq!(indoor.select_kind("Geschikt voor"), SelectKind::Multiselect);
        assert_eq!(indoor.range_step("Prijs"), 50.0);
        assert_eq!(indoor.range_step("Geluidsniveau (dB)"), 1.0);
    }

    #[test]
    fn test_bundled_seed_matches_registry() {
        let registry = bundled_registry().unwrap();
        let seed = bundled_seed().unwrap();

        for (resource, items) in &seed {
            let config = registry.get(resource).unwrap();
            assert!(!items.is_empty(), "{resource} has no items");
            assert!(
                items.iter().all(|item| item.get(&config.id_field).is_some()),
                "{resource} has an item without {}",
                config.id_field
            );
        }
        assert_eq!(seed.len(), registry.len());
    }

    #[test]
    fn test_missing_seed_file() {
        let result = seed_from_path("/nonexistent/catalog.json");
        assert!(matches!(result, Err(ServiceError::SeedIo { .. })));
    }

    #[test]
    fn test_malformed_seed() {
        let result = parse_seed(r#"{"batteries": {"id": 1}}"#);
        assert!(matches!(result, Err(ServiceError::Seed(_))));
    }
}
