//! # Resource Configuration
//!
//! A [`ResourceConfig`] is the *only* resource-specific input the engine ever sees: it says
//! which raw field labels are searchable, filterable (categorical) and range-filterable.
//! The [`ResourceRegistry`] holds one config per resource name and is loaded once at startup
//! from TOML:
//!
//! ```toml
//! [[resource]]
//! name = "batteries"
//! searchable_fields = ["Merk", "Model"]
//! filterable_fields = ["Merk", "Chemie"]
//! range_fields = ["Capaciteit (kWh)", "Prijs"]
//!
//! [resource.range_steps]
//! "Prijs" = 100.0
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Errors raised while loading the registry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid resource config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("Resource {resource}: {reason}")]
    Invalid { resource: String, reason: String },
}

fn default_id_field() -> String {
    "id".to_string()
}

/// How a categorical field is presented in `filterMetadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    Select,
    Multiselect,
}

/// Field classification for one resource. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default)]
    pub searchable_fields: Vec<String>,
    #[serde(default)]
    pub filterable_fields: Vec<String>,
    #[serde(default)]
    pub range_fields: Vec<String>,
    /// Filterable fields whose facet is rendered as `multiselect`.
    #[serde(default)]
    pub multiselect_fields: Vec<String>,
    /// Fields that may be sorted on beyond the classified ones.
    #[serde(default)]
    pub sortable_fields: Vec<String>,
    #[serde(default)]
    pub range_steps: BTreeMap<String, f64>,
}

impl ResourceConfig {
    /// Creates a config with the identifier field `id` and the three field lists.
    pub fn new(
        name: impl Into<String>,
        searchable_fields: &[&str],
        filterable_fields: &[&str],
        range_fields: &[&str],
    ) -> Self {
        let owned = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect();
        Self {
            name: name.into(),
            id_field: default_id_field(),
            searchable_fields: owned(searchable_fields),
            filterable_fields: owned(filterable_fields),
            range_fields: owned(range_fields),
            multiselect_fields: Vec::new(),
            sortable_fields: Vec::new(),
            range_steps: BTreeMap::new(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_multiselect(mut self, field: impl Into<String>) -> Self {
        self.multiselect_fields.push(field.into());
        self
    }

    pub fn with_range_step(mut self, field: impl Into<String>, step: f64) -> Self {
        self.range_steps.insert(field.into(), step);
        self
    }

    pub fn select_kind(&self, field: &str) -> SelectKind {
        if self.multiselect_fields.iter().any(|f| f == field) {
            SelectKind::Multiselect
        } else {
            SelectKind::Select
        }
    }

    pub fn range_step(&self, field: &str) -> f64 {
        self.range_steps.get(field).copied().unwrap_or(1.0)
    }

    /// Whether `field` may be used as the primary sort key.
    pub fn is_sortable(&self, field: &str) -> bool {
        field == self.id_field
            || [
                &self.searchable_fields,
                &self.filterable_fields,
                &self.range_fields,
                &self.sortable_fields,
            ]
            .iter()
            .any(|fields| fields.iter().any(|f| f == field))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            resource: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("resource name is empty".into()));
        }
        if let Some(field) = self
            .multiselect_fields
            .iter()
            .find(|f| !self.filterable_fields.contains(f))
        {
            return Err(invalid(format!(
                "multiselect field {field:?} is not a filterable field"
            )));
        }
        for (field, step) in &self.range_steps {
            if !self.range_fields.contains(field) {
                return Err(invalid(format!(
                    "range step given for {field:?}, which is not a range field"
                )));
            }
            if !(step.is_finite() && *step > 0.0) {
                return Err(invalid(format!("range step for {field:?} must be positive")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "resource")]
    resources: Vec<ResourceConfig>,
}

/// Lookup table from resource name to its [`ResourceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceRegistry {
    /// Builds a registry from already-constructed configs.
    pub fn new(configs: impl IntoIterator<Item = ResourceConfig>) -> Result<Self, ConfigError> {
        let mut resources = BTreeMap::new();
        let mut seen = HashSet::new();
        for config in configs {
            config.validate()?;
            if !seen.insert(config.name.clone()) {
                return Err(ConfigError::DuplicateResource(config.name));
            }
            resources.insert(config.name.clone(), config);
        }
        Ok(Self { resources })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile = toml::from_str(content)?;
        Self::new(file.resources)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
