use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use super::collection::CollectionUpgrader;
use super::error::UpgradeError;
use super::locator::StepLocator;
use super::registry::VersionRegistry;
use super::types::{CollectionSchemaStatus, CollectionUpgradeResult, SchemaStatusReport, UpgradeRunResult};
use crate::core::client::database::{DocumentFilter, DocumentStore};

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Runs the cascade for every registered collection and reports the outcome as data.
///
/// Collections are independent of each other and are upgraded concurrently,
/// at most `max_concurrency` at a time. Results always come back in registry
/// order.
#[derive(Clone)]
pub struct UpgradeOrchestrator {
    store: Arc<dyn DocumentStore>,
    registry: Arc<VersionRegistry>,
    upgrader: CollectionUpgrader,
    max_concurrency: usize,
}

impl UpgradeOrchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<VersionRegistry>, locator: Arc<StepLocator>) -> Self {
        let upgrader = CollectionUpgrader::new(store.clone(), registry.clone(), locator);
        Self { store, registry, upgrader, max_concurrency: DEFAULT_MAX_CONCURRENCY }
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// run_all - Upgrade every registered collection
    pub async fn run_all(&self, cancellation: &CancellationToken) -> UpgradeRunResult {
        let mut run = UpgradeRunResult::start();
        let collections: Vec<String> =
            self.registry.all_entries().into_iter().map(|entry| entry.collection_name).collect();

        info!(collections = collections.len(), max_concurrency = self.max_concurrency, "🚀 Starting schema upgrade run");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, collection) in collections.iter().cloned().enumerate() {
            let upgrader = self.upgrader.clone();
            let semaphore = semaphore.clone();
            let cancellation = cancellation.clone();
            let span = info_span!("schema_upgrade", collection = %collection);

            tasks.spawn(
                async move {
                    // The semaphore is never closed, so a failed acquire only happens on shutdown.
                    let _permit = semaphore.acquire_owned().await.ok();
                    if cancellation.is_cancelled() {
                        warn!("Cancellation requested before collection upgrade started");
                        let mut result = CollectionUpgradeResult::new(&collection, upgrader.target_version(&collection));
                        result.cancelled = true;
                        return (index, result);
                    }
                    (index, upgrader.upgrade(&collection, &cancellation).await)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<CollectionUpgradeResult>> = vec![None; collections.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "Collection upgrade task failed"),
            }
        }

        for (collection, slot) in collections.iter().zip(slots) {
            match slot {
                Some(result) => run.absorb(&result),
                None => run.record_error(&UpgradeError::TaskAborted {
                    collection: collection.clone(),
                    reason: "task panicked or was aborted".to_string(),
                }),
            }
        }

        let run = run.finish();
        info!(
            collections_upgraded = run.collections_upgraded.len(),
            total_upgraded = run.total_documents_upgraded,
            errors = run.errors.len(),
            cancelled = run.cancelled,
            "✅ Schema upgrade run completed"
        );
        run
    }

    /// run_all_with_deadline - Upgrade every registered collection, stopping new work after `timeout`
    ///
    /// Cancelling `cancellation` still stops the run early.
    pub async fn run_all_with_deadline(&self, timeout: Duration, cancellation: &CancellationToken) -> UpgradeRunResult {
        let deadline = cancellation.child_token();
        let timer = tokio::spawn({
            let deadline = deadline.clone();
            async move {
                tokio::time::sleep(timeout).await;
                warn!(timeout_secs = timeout.as_secs_f64(), "⏱️ Schema upgrade deadline reached, cancelling");
                deadline.cancel();
            }
        });

        let run = self.run_all(&deadline).await;
        timer.abort();
        run
    }

    /// run_collection - Re-run the cascade for one collection
    pub async fn run_collection(&self, collection: &str, cancellation: &CancellationToken) -> CollectionUpgradeResult {
        self.upgrader
            .upgrade(collection, cancellation)
            .instrument(info_span!("schema_upgrade", collection = %collection))
            .await
    }

    /// schema_status - Current version spread of every registered collection
    pub async fn schema_status(&self) -> Result<SchemaStatusReport, UpgradeError> {
        let statuses = try_join_all(
            self.registry.all_entries().into_iter().map(|entry| async move {
                let status = self.collection_status(&entry.collection_name, entry.target_version).await?;
                Ok::<_, UpgradeError>((entry.collection_name, status))
            }),
        )
        .await?;
        Ok(statuses.into_iter().collect())
    }

    async fn collection_status(
        &self,
        collection: &str,
        target_version: u32,
    ) -> Result<CollectionSchemaStatus, UpgradeError> {
        let access = |source| UpgradeError::CollectionAccess { collection: collection.to_string(), source };

        let total_documents = self.store.count(collection, DocumentFilter::All).await.map_err(access)?;
        let version_distribution = self.store.version_distribution(collection).await.map_err(access)?;
        let min_version = version_distribution.keys().next().copied();

        Ok(CollectionSchemaStatus {
            current_target_version: target_version,
            total_documents,
            min_version,
            needs_migration: min_version.is_some_and(|min| min < target_version),
            version_distribution,
        })
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }
}
