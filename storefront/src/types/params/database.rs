use crate::config::types::database::{DatabaseConfig, DatabaseType};
use crate::error::{StorefrontError, StorefrontResult};

/// DatabaseArgs - Arguments used to connect to MongoDB
#[derive(Debug, Clone)]
pub struct DatabaseArgs {
    pub connection_uri: String,
    pub database_name: String,
}

/// Document store selected for this process.
#[derive(Debug, Clone)]
pub enum DatabaseParams {
    MongoDB(DatabaseArgs),
    /// Process-local store, starts empty.
    Memory,
}

impl TryFrom<&DatabaseConfig> for DatabaseParams {
    type Error = StorefrontError;

    fn try_from(config: &DatabaseConfig) -> StorefrontResult<Self> {
        match config.db_type {
            DatabaseType::MongoDB => {
                let mongodb = config.mongodb.as_ref().ok_or_else(|| {
                    StorefrontError::ConfigError("database.mongodb is required when database.type is mongodb".into())
                })?;
                Ok(Self::MongoDB(DatabaseArgs {
                    connection_uri: mongodb.connection_url.clone(),
                    database_name: mongodb.database_name.clone(),
                }))
            }
            DatabaseType::Memory => Ok(Self::Memory),
        }
    }
}
