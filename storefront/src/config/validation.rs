use anyhow::{bail, Result};

use super::types::{DatabaseConfig, DatabaseType, SchemaConfig, ServerConfig};
use super::StorefrontConfigV1;

/// Validation hook run once a configuration has been fully assembled
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for StorefrontConfigV1 {
    fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.server.validate()?;
        self.schema.validate()
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<()> {
        match (self.db_type, &self.mongodb) {
            (DatabaseType::MongoDB, None) => bail!("database.mongodb is required when database.type is mongodb"),
            (DatabaseType::MongoDB, Some(mongodb)) if mongodb.connection_url.trim().is_empty() => {
                bail!("database.mongodb.connection_url must not be empty")
            }
            (DatabaseType::MongoDB, Some(mongodb)) if mongodb.database_name.trim().is_empty() => {
                bail!("database.mongodb.database_name must not be empty")
            }
            _ => Ok(()),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        Ok(())
    }
}

impl Validate for SchemaConfig {
    fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            bail!("schema.max_concurrency must be at least 1");
        }
        if self.timeout_secs == Some(0) {
            bail!("schema.timeout_secs must be at least 1 when set");
        }
        if let Some((collection, _)) = self.collections.iter().find(|(_, target)| **target < 1) {
            bail!("schema.collections.{collection}: target version must be at least 1");
        }
        Ok(())
    }
}
