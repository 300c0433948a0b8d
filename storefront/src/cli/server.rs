use clap::Args;

/// Parameters used to config the server.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct ServerCliArgs {
    /// The host to listen on.
    #[arg(env = "STOREFRONT_HOST", long)]
    pub host: Option<String>,

    /// The port to listen on.
    #[arg(env = "STOREFRONT_PORT", long)]
    pub port: Option<u16>,

    /// Enable admin endpoints for schema operations.
    #[arg(env = "STOREFRONT_ADMIN_ENABLED", long, num_args = 0..=1, default_missing_value = "true")]
    pub admin_enabled: Option<bool>,
}
