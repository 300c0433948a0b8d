pub mod builder;
pub mod env_interpolation;
pub mod types;
pub mod validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use builder::ConfigBuilder;
pub use types::*;

use env_interpolation::interpolate_yaml_content;

/// Versioned configuration wrapper
/// This allows us to evolve the config format over time while maintaining backward compatibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "config_version")]
pub enum StorefrontConfigVersioned {
    #[serde(rename = "1")]
    V1(StorefrontConfigV1),
}

impl StorefrontConfigVersioned {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load configuration from a YAML string, after `${VAR}` interpolation
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let content = interpolate_yaml_content(content)?;

        let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content).context("Failed to parse YAML")?;
        if yaml_value.get("config_version").is_none() {
            anyhow::bail!(
                "Missing required field 'config_version' in config file. \
                 Current supported version: 1"
            );
        }

        serde_yaml::from_str(&content).context("Failed to deserialize config")
    }

    /// Convert to the canonical (latest) config format
    pub fn into_canonical(self) -> StorefrontConfig {
        match self {
            StorefrontConfigVersioned::V1(v1) => v1,
        }
    }
}

/// Canonical configuration (always latest version internally)
pub type StorefrontConfig = StorefrontConfigV1;

/// Version 1 of the storefront configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfigV1 {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}
