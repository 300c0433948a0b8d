use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::config::StorefrontConfig;
use crate::core::client::{DocumentStore, InMemoryDocumentStore, MongoDbClient};
use crate::error::StorefrontResult;
use crate::schema::revisions::default_steps;
use crate::schema::{StepLocator, UpgradeOrchestrator, VersionRegistry};
use crate::types::params::{DatabaseParams, ServerParams, UpgradeParams};

/// The app config. Built once at start-up and shared by the server, the
/// CLI commands and the upgrade engine.
pub struct Config {
    /// The document store holding every collection
    store: Arc<dyn DocumentStore>,
    /// Target schema version per collection
    registry: Arc<VersionRegistry>,
    /// Upgrade steps compiled into this build
    locator: Arc<StepLocator>,
    server_config: ServerParams,
    upgrade_config: UpgradeParams,
    /// Set once the start-up upgrade run has finished
    ready: AtomicBool,
}

impl Config {
    /// Setup the storefront from a validated configuration
    pub async fn setup(config: &StorefrontConfig) -> StorefrontResult<Self> {
        let database = DatabaseParams::try_from(&config.database)?;
        let store = Self::build_document_store(&database).await?;
        Self::new(store, ServerParams::from(&config.server), UpgradeParams::from(&config.schema))
    }

    /// Wires the compiled-in registry and steps around an existing store.
    ///
    /// Fails when a registered step targets a version beyond its collection's target.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        server_config: ServerParams,
        upgrade_config: UpgradeParams,
    ) -> StorefrontResult<Self> {
        let registry = VersionRegistry::with_defaults().with_overrides(upgrade_config.target_overrides.clone())?;
        let locator = StepLocator::new(default_steps())?;
        locator.validate_against(&registry)?;

        info!(collections = registry.len(), steps = locator.len(), "Schema registry initialized");

        Ok(Self {
            store,
            registry: Arc::new(registry),
            locator: Arc::new(locator),
            server_config,
            upgrade_config,
            ready: AtomicBool::new(false),
        })
    }

    async fn build_document_store(database: &DatabaseParams) -> StorefrontResult<Arc<dyn DocumentStore>> {
        match database {
            DatabaseParams::MongoDB(args) => {
                info!(database = %args.database_name, "Connecting to MongoDB");
                Ok(Arc::new(MongoDbClient::new(args).await?))
            }
            DatabaseParams::Memory => {
                info!("Using in-memory document store");
                Ok(Arc::new(InMemoryDocumentStore::new()))
            }
        }
    }

    /// Returns the document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    pub fn server_config(&self) -> &ServerParams {
        &self.server_config
    }

    pub fn upgrade_config(&self) -> &UpgradeParams {
        &self.upgrade_config
    }

    /// Orchestrator over this config's store, registry and steps
    pub fn upgrade_orchestrator(&self) -> UpgradeOrchestrator {
        UpgradeOrchestrator::new(self.store.clone(), self.registry.clone(), self.locator.clone())
            .with_max_concurrency(self.upgrade_config.max_concurrency)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }
}
