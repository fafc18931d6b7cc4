//! Plugin registry configuration.
//!
//! Controls which capability categories a registry accepts and how
//! manifest directories are scanned during discovery.

use crate::core::{Category, Error, Result};
use serde::{Deserialize, Serialize};

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Capability categories `register` accepts
    pub accepted_categories: Vec<Category>,
    /// Manifest directory scanning
    pub discovery: DiscoveryConfig,
}

impl RegistryConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid registry config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Restrict the registry to a single category.
    pub fn only(category: Category) -> Self {
        Self {
            accepted_categories: vec![category],
            ..Default::default()
        }
    }

    /// Whether `category` passes the capability check.
    pub fn accepts(&self, category: Category) -> bool {
        self.accepted_categories.contains(&category)
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.accepted_categories.is_empty() {
            return Err(Error::Config(
                "accepted_categories must name at least one category".to_string(),
            ));
        }
        if self.discovery.manifest_suffix.is_empty() {
            return Err(Error::Config(
                "discovery.manifest_suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            accepted_categories: Category::ALL.to_vec(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Manifest directory discovery configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File name suffix identifying plugin manifests
    pub manifest_suffix: String,
    /// Files whose name starts with this prefix are ignored
    pub skip_prefix: String,
    /// Also scan immediate subdirectories
    pub follow_subdirectories: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            manifest_suffix: ".plugin.json".to_string(),
            skip_prefix: "_".to_string(),
            follow_subdirectories: false,
        }
    }
}
