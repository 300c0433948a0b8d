use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::DEFAULT_MAX_CONCURRENCY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Stop starting new upgrade work after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Target version per collection, on top of the compiled-in defaults.
    #[serde(default)]
    pub collections: BTreeMap<String, u32>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
            max_concurrency: default_max_concurrency(),
            timeout_secs: None,
            collections: BTreeMap::new(),
        }
    }
}

fn default_run_on_startup() -> bool {
    true
}
fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}
