use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: DatabaseType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongodb: Option<MongoDBConfig>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { db_type: DatabaseType::MongoDB, mongodb: Some(MongoDBConfig::default()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[value(name = "mongodb")]
    MongoDB,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDBConfig {
    pub connection_url: String,

    #[serde(default = "default_db_name")]
    pub database_name: String,
}

impl Default for MongoDBConfig {
    fn default() -> Self {
        Self { connection_url: default_connection_url(), database_name: default_db_name() }
    }
}

fn default_connection_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_db_name() -> String {
    "storefront".to_string()
}
