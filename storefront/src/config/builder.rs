//! Configuration builder that implements the hierarchy: CLI > ENV > Config File > Defaults

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use super::types::MongoDBConfig;
use super::validation::Validate;
use super::{StorefrontConfig, StorefrontConfigVersioned};
use crate::cli::database::DatabaseCliArgs;
use crate::cli::server::ServerCliArgs;
use crate::cli::upgrade::UpgradeCliArgs;

/// Configuration builder that merges config from multiple sources
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: StorefrontConfig,
}

impl ConfigBuilder {
    /// Create a new config builder holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a file path, replacing the defaults
    pub fn with_config_file(mut self, path: &Path) -> Result<Self> {
        info!("Loading configuration from file: {}", path.display());
        self.config = StorefrontConfigVersioned::from_yaml_file(path)?.into_canonical();
        Ok(self)
    }

    /// Load config from a file path when one was given
    pub fn with_optional_config_file(self, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => self.with_config_file(path),
            None => Ok(self),
        }
    }

    pub fn with_database_overrides(mut self, args: &DatabaseCliArgs) -> Self {
        let database = &mut self.config.database;

        if let Some(db_type) = args.database_type {
            debug!("Overriding database.type from CLI: {:?}", db_type);
            database.db_type = db_type;
        }

        let mongodb_args = &args.mongodb_args;
        if mongodb_args.mongodb_connection_url.is_some() || mongodb_args.mongodb_database_name.is_some() {
            let mongodb = database.mongodb.get_or_insert_with(MongoDBConfig::default);
            if let Some(url) = &mongodb_args.mongodb_connection_url {
                debug!("Overriding database.mongodb.connection_url from CLI");
                mongodb.connection_url = url.clone();
            }
            if let Some(name) = &mongodb_args.mongodb_database_name {
                debug!("Overriding database.mongodb.database_name from CLI: {}", name);
                mongodb.database_name = name.clone();
            }
        }
        self
    }

    pub fn with_server_overrides(mut self, args: &ServerCliArgs) -> Self {
        let server = &mut self.config.server;
        if let Some(host) = &args.host {
            debug!("Overriding server.host from CLI: {}", host);
            server.host = host.clone();
        }
        if let Some(port) = args.port {
            debug!("Overriding server.port from CLI: {}", port);
            server.port = port;
        }
        if let Some(admin_enabled) = args.admin_enabled {
            debug!("Overriding server.admin_enabled from CLI: {}", admin_enabled);
            server.admin_enabled = admin_enabled;
        }
        self
    }

    pub fn with_upgrade_overrides(mut self, args: &UpgradeCliArgs) -> Self {
        let schema = &mut self.config.schema;
        if let Some(max_concurrency) = args.max_concurrency {
            debug!("Overriding schema.max_concurrency from CLI: {}", max_concurrency);
            schema.max_concurrency = max_concurrency;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            debug!("Overriding schema.timeout_secs from CLI: {}", timeout_secs);
            schema.timeout_secs = Some(timeout_secs);
        }
        self
    }

    pub fn with_startup_upgrade(mut self, enabled: bool) -> Self {
        if !enabled {
            debug!("Start-up schema upgrade disabled from CLI");
            self.config.schema.run_on_startup = false;
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<StorefrontConfig> {
        info!("Validating configuration");
        self.config.validate().context("Invalid configuration")?;
        Ok(self.config)
    }
}
