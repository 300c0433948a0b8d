pub mod database;
pub mod schema;
pub mod server;

pub use database::{DatabaseConfig, DatabaseType, MongoDBConfig};
pub use schema::SchemaConfig;
pub use server::ServerConfig;
