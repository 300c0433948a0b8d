use clap::Args;

/// Parameters used to config MongoDB.
#[derive(Debug, Clone, Args)]
pub struct MongoDBCliArgs {
    /// The connection string to the MongoDB server.
    #[arg(env = "STOREFRONT_MONGODB_CONNECTION_URL", long)]
    pub mongodb_connection_url: Option<String>,

    /// The name of the database.
    #[arg(env = "STOREFRONT_DATABASE_NAME", long)]
    pub mongodb_database_name: Option<String>,
}
