//! Catalog policy: which plugins the editor offers and how legacy plugin
//! labels map to wrapper plugins. Read from a `catalog.toml` such as:
//!
//! ```toml
//! [catalog]
//! excluded-visibilities = ["internal"]
//! excluded-ids = ["otoroshi.next.proxy.ProxyEngine"]
//!
//! [catalog.legacy-overrides]
//! job = "otoroshi.next.plugins.wrappers.JobWrapper"
//! ```

use formwright_model::PluginDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Policy configuration, usually parsed from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPolicy {
    /// Plugins whose `plugin_visibility` is listed here are hidden.
    #[serde(default = "default_excluded_visibilities")]
    pub excluded_visibilities: Vec<String>,
    /// Plugins hidden by id, compared without the `cp:` prefix.
    #[serde(default = "default_excluded_ids")]
    pub excluded_ids: Vec<String>,
    /// Extra or replacement entries for the legacy wrapper table.
    #[serde(default)]
    pub legacy_overrides: HashMap<String, String>,
}

fn default_excluded_visibilities() -> Vec<String> {
    vec!["internal".to_string()]
}

fn default_excluded_ids() -> Vec<String> {
    vec!["otoroshi.next.proxy.ProxyEngine".to_string()]
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            excluded_visibilities: default_excluded_visibilities(),
            excluded_ids: default_excluded_ids(),
            legacy_overrides: HashMap::new(),
        }
    }
}

impl CatalogPolicy {
    /// Loads policy from `path`. Falls back to the defaults when the file is
    /// missing or cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No catalog policy at {:?}, using defaults", path);
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(policy) => {
                    info!("Loaded catalog policy from {:?}", path);
                    policy
                }
                Err(e) => {
                    warn!("Failed to parse catalog policy {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read catalog policy {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<PolicyFile>(contents).map(|file| file.catalog.into_policy())
    }

    /// Why `plugin` is hidden from the catalog, if it is.
    pub fn exclusion(&self, plugin: &PluginDescriptor) -> Option<String> {
        if let Some(visibility) = &plugin.plugin_visibility {
            if self.excluded_visibilities.contains(visibility) {
                return Some(format!("visibility '{visibility}'"));
            }
        }
        let bare = plugin.id.strip_prefix("cp:").unwrap_or(&plugin.id);
        self.excluded_ids
            .iter()
            .any(|id| id == bare)
            .then(|| "excluded id".to_string())
    }

    pub fn is_excluded(&self, plugin: &PluginDescriptor) -> bool {
        self.exclusion(plugin).is_some()
    }
}

/// Raw TOML structure of `catalog.toml`.
#[derive(Deserialize)]
struct PolicyFile {
    #[serde(default)]
    catalog: CatalogSection,
}

#[derive(Deserialize, Default)]
struct CatalogSection {
    #[serde(default, rename = "excluded-visibilities")]
    excluded_visibilities: Option<Vec<String>>,
    #[serde(default, rename = "excluded-ids")]
    excluded_ids: Option<Vec<String>>,
    #[serde(default, rename = "legacy-overrides")]
    legacy_overrides: HashMap<String, String>,
}

impl CatalogSection {
    fn into_policy(self) -> CatalogPolicy {
        CatalogPolicy {
            excluded_visibilities: self
                .excluded_visibilities
                .unwrap_or_else(default_excluded_visibilities),
            excluded_ids: self.excluded_ids.unwrap_or_else(default_excluded_ids),
            legacy_overrides: self.legacy_overrides,
        }
    }
}
