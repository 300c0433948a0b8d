use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{TransformError, UpgradeError};
use super::types::UpgradeStepResult;
use crate::core::client::database::constant::{DOCUMENT_KEY_FIELD, INTERNAL_ID_FIELD, SCHEMA_VERSION_FIELD};
use crate::core::client::database::filter::version_to_bson;
use crate::core::client::database::{DatabaseError, DocumentFilter, DocumentStore};

/// Shared state handed to every step of one cascade.
#[derive(Debug, Clone)]
pub struct StepContext {
    run_started_at: DateTime<Utc>,
    cancellation: CancellationToken,
}

impl StepContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { run_started_at: Utc::now(), cancellation }
    }

    /// Timestamp stamped on records created by a step, fixed for the whole cascade.
    pub fn timestamp(&self) -> bson::DateTime {
        bson::DateTime::from_chrono(self.run_started_at)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A transformation moving one collection's documents from `to_version - 1` to `to_version`.
///
/// Implementations only describe the per-document patch; selection, write-back
/// and error accounting are done by [`run_step`].
pub trait UpgradeStep: Send + Sync {
    fn collection(&self) -> &'static str;

    fn to_version(&self) -> u32;

    fn from_version(&self) -> u32 {
        self.to_version().saturating_sub(1)
    }

    /// Human readable summary used in logs.
    fn description(&self) -> &'static str;

    /// Fields to `$set` on `document`. The schema version is added by the caller.
    fn patch(&self, document: &Document, ctx: &StepContext) -> Result<Document, TransformError>;
}

/// Runs a step over every document currently eligible for it.
///
/// Per-document failures are collected in the result and never abort the batch.
/// An `Err` is only returned when the eligible documents could not be read at all.
pub async fn run_step(
    step: &dyn UpgradeStep,
    store: &dyn DocumentStore,
    ctx: &StepContext,
) -> Result<UpgradeStepResult, DatabaseError> {
    let collection = step.collection();
    let (from_version, to_version) = (step.from_version(), step.to_version());
    let mut result = UpgradeStepResult::new(collection, from_version, to_version);

    info!(collection, from_version, to_version, step = step.description(), "🔄 Running upgrade step");

    let documents = store.find(collection, DocumentFilter::SchemaVersion(from_version)).await?;
    let selected = documents.len();

    for document in documents {
        if ctx.is_cancelled() {
            warn!(
                collection,
                from_version,
                to_version,
                processed = result.documents_processed,
                selected,
                "Upgrade step interrupted by cancellation"
            );
            result.interrupted = true;
            break;
        }

        result.documents_processed += 1;
        match upgrade_document(step, store, &document, ctx).await {
            Ok(WriteOutcome::Upgraded) => result.documents_upgraded += 1,
            Ok(WriteOutcome::AlreadyAdvanced) => result.documents_skipped += 1,
            Err(e) => {
                warn!(collection, to_version, error = %e, "Document upgrade failed");
                result.errors.push(e.to_string());
            }
        }
    }

    result.completed_at = Utc::now();
    info!(
        collection,
        from_version,
        to_version,
        processed = result.documents_processed,
        upgraded = result.documents_upgraded,
        skipped = result.documents_skipped,
        failed = result.errors.len(),
        "✅ Upgrade step completed"
    );
    Ok(result)
}

enum WriteOutcome {
    Upgraded,
    /// The stored document left `from_version` after it was read.
    AlreadyAdvanced,
}

async fn upgrade_document(
    step: &dyn UpgradeStep,
    store: &dyn DocumentStore,
    document: &Document,
    ctx: &StepContext,
) -> Result<WriteOutcome, UpgradeError> {
    let collection = step.collection();
    let (from_version, to_version) = (step.from_version(), step.to_version());
    let failure = |reason: String| UpgradeError::DocumentTransform {
        collection: collection.to_string(),
        key: describe_key(document),
        to_version,
        reason,
    };

    let key = document_key(document)
        .ok_or_else(|| failure(TransformError::MissingKey { field: DOCUMENT_KEY_FIELD }.to_string()))?;

    let mut patch = step.patch(document, ctx).map_err(|e| failure(e.to_string()))?;
    patch.insert(SCHEMA_VERSION_FIELD, version_to_bson(to_version));

    let outcome =
        store.update_one(collection, &key, from_version, patch).await.map_err(|e| failure(e.to_string()))?;
    if outcome.matched_count == 0 {
        debug!(collection, key = %key, from_version, "Document no longer at source version, skipping");
        return Ok(WriteOutcome::AlreadyAdvanced);
    }

    debug!(collection, key = %key, to_version, "Document upgraded");
    Ok(WriteOutcome::Upgraded)
}

fn document_key(document: &Document) -> Option<Bson> {
    match document.get(DOCUMENT_KEY_FIELD) {
        None | Some(Bson::Null) => None,
        Some(key) => Some(key.clone()),
    }
}

/// Identifies a document in error messages, falling back to the storage id when the stable key is missing.
fn describe_key(document: &Document) -> String {
    match (document_key(document), document.get(INTERNAL_ID_FIELD)) {
        (Some(key), _) => key.to_string(),
        (None, Some(internal_id)) => format!("{}={}", INTERNAL_ID_FIELD, internal_id),
        (None, None) => "<unidentified>".to_string(),
    }
}
