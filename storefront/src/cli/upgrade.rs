use clap::Args;

/// Parameters used to config schema upgrade runs.
#[derive(Debug, Clone, Args)]
pub struct UpgradeCliArgs {
    /// Maximum number of collections upgraded at the same time.
    #[arg(env = "STOREFRONT_UPGRADE_MAX_CONCURRENCY", long = "upgrade-max-concurrency")]
    pub max_concurrency: Option<usize>,

    /// Stop starting new upgrade work after this many seconds.
    #[arg(env = "STOREFRONT_UPGRADE_TIMEOUT_SECS", long = "upgrade-timeout-secs")]
    pub timeout_secs: Option<u64>,
}
