pub mod mongodb;

use clap::Args;

use crate::config::types::DatabaseType;

/// Parameters used to select the document store.
#[derive(Debug, Clone, Args)]
pub struct DatabaseCliArgs {
    /// Document store backing the service.
    #[arg(env = "STOREFRONT_DATABASE_TYPE", long = "database-type", value_enum)]
    pub database_type: Option<DatabaseType>,

    #[clap(flatten)]
    pub mongodb_args: mongodb::MongoDBCliArgs,
}
