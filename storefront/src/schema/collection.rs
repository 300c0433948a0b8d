use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::UpgradeError;
use super::locator::StepLocator;
use super::registry::VersionRegistry;
use super::step::{run_step, StepContext};
use super::types::{CollectionUpgradeResult, UpgradeStepResult};
use crate::core::client::database::{DocumentFilter, DocumentStore};

/// Drives the version cascade of a single collection.
///
/// Steps run strictly one after another in increasing version order. Failures
/// are folded into the returned [`CollectionUpgradeResult`]; nothing here
/// returns an error to the caller.
#[derive(Clone)]
pub struct CollectionUpgrader {
    store: Arc<dyn DocumentStore>,
    registry: Arc<VersionRegistry>,
    locator: Arc<StepLocator>,
}

impl CollectionUpgrader {
    pub fn new(store: Arc<dyn DocumentStore>, registry: Arc<VersionRegistry>, locator: Arc<StepLocator>) -> Self {
        Self { store, registry, locator }
    }

    pub fn target_version(&self, collection: &str) -> u32 {
        self.registry.target_version(collection)
    }

    pub async fn upgrade(&self, collection: &str, cancellation: &CancellationToken) -> CollectionUpgradeResult {
        let target_version = self.registry.target_version(collection);
        let mut result = CollectionUpgradeResult::new(collection, target_version);

        let min_version = match self.store.min_schema_version(collection).await {
            Ok(Some(version)) => version,
            Ok(None) => {
                debug!(collection, "Collection is empty, nothing to upgrade");
                return result;
            }
            Err(source) => {
                let err = UpgradeError::CollectionAccess { collection: collection.to_string(), source };
                warn!(collection, error = %err, "Could not read minimum schema version");
                result.record_error(&err);
                return result;
            }
        };
        result.starting_version = Some(min_version);

        if min_version >= target_version {
            debug!(collection, min_version, target_version, "Collection already at target version");
            return result;
        }

        info!(collection, from_version = min_version, to_version = target_version, "Upgrading collection");
        let ctx = StepContext::new(cancellation.clone());

        for from_version in min_version..target_version {
            let to_version = from_version + 1;

            if cancellation.is_cancelled() {
                warn!(collection, from_version, to_version, "Cancellation requested, stopping cascade");
                result.cancelled = true;
                break;
            }

            let eligible = match self.store.count(collection, DocumentFilter::SchemaVersion(from_version)).await {
                Ok(eligible) => eligible,
                Err(source) => {
                    let err = UpgradeError::CollectionAccess { collection: collection.to_string(), source };
                    warn!(collection, from_version, error = %err, "Could not count eligible documents");
                    result.record_error(&err);
                    break;
                }
            };
            if eligible == 0 {
                continue;
            }

            let Some(step) = self.locator.resolve(collection, to_version) else {
                // Documents keep their version; the next registered step will not select them.
                warn!(collection, from_version, to_version, eligible, "No upgrade step registered, skipping version");
                result.record_step(UpgradeStepResult::absent(collection, from_version, to_version));
                continue;
            };

            match run_step(step.as_ref(), self.store.as_ref(), &ctx).await {
                Ok(step_result) => result.record_step(step_result),
                Err(source) => {
                    let err = UpgradeError::CollectionAccess { collection: collection.to_string(), source };
                    warn!(collection, from_version, to_version, error = %err, "Could not read eligible documents");
                    result.record_error(&err);
                    break;
                }
            }

            if result.cancelled {
                break;
            }
        }

        info!(
            collection,
            upgraded = result.documents_upgraded,
            errors = result.errors.len(),
            cancelled = result.cancelled,
            "Collection upgrade finished"
        );
        result
    }
}
