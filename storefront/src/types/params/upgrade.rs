use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::types::schema::SchemaConfig;

/// UpgradeParams - How and when schema upgrades run
#[derive(Debug, Clone)]
pub struct UpgradeParams {
    /// Run every pending upgrade before the service reports ready.
    pub run_on_startup: bool,
    pub max_concurrency: usize,
    pub timeout: Option<Duration>,
    /// Target version overrides on top of the compiled-in registry.
    pub target_overrides: BTreeMap<String, u32>,
}

impl From<&SchemaConfig> for UpgradeParams {
    fn from(value: &SchemaConfig) -> Self {
        Self {
            run_on_startup: value.run_on_startup,
            max_concurrency: value.max_concurrency,
            timeout: value.timeout_secs.map(Duration::from_secs),
            target_overrides: value.collections.clone(),
        }
    }
}
