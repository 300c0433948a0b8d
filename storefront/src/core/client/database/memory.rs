use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::constant::DOCUMENT_KEY_FIELD;
use super::error::DatabaseError;
use super::filter::schema_version_of;
use super::{DocumentFilter, DocumentStore, UpdateResult};

/// Process-local [`DocumentStore`] keeping every collection in memory.
///
/// Backs `database.type: memory` for dry runs, and the upgrade scenarios in tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().extend(documents);
    }

    /// Snapshot of a collection, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections.read().await.get(collection).cloned().unwrap_or_default()
    }

    /// Looks a document up by its stable key.
    pub async fn get(&self, collection: &str, key: &Bson) -> Option<Document> {
        let collections = self.collections.read().await;
        collections.get(collection)?.iter().find(|document| document.get(DOCUMENT_KEY_FIELD) == Some(key)).cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn min_schema_version(&self, collection: &str) -> Result<Option<u32>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| documents.iter().filter_map(schema_version_of).min()))
    }

    async fn find(&self, collection: &str, filter: DocumentFilter) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| documents.iter().filter(|document| filter.matches(document)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        key: &Bson,
        expected_version: u32,
        patch: Document,
    ) -> Result<UpdateResult, DatabaseError> {
        let guard = DocumentFilter::SchemaVersion(expected_version);
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|document| document.get(DOCUMENT_KEY_FIELD) == Some(key) && guard.matches(document))
        });

        let Some(document) = target else {
            return Ok(UpdateResult { matched_count: 0, modified_count: 0 });
        };

        let mut modified = false;
        for (field, value) in patch {
            if document.get(&field) != Some(&value) {
                document.insert(field, value);
                modified = true;
            }
        }
        Ok(UpdateResult { matched_count: 1, modified_count: u64::from(modified) })
    }

    async fn count(&self, collection: &str, filter: DocumentFilter) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|documents| documents.iter().filter(|document| filter.matches(document)).count())
            .unwrap_or_default();
        Ok(count as u64)
    }

    async fn version_distribution(&self, collection: &str) -> Result<BTreeMap<u32, u64>, DatabaseError> {
        let collections = self.collections.read().await;
        let mut distribution = BTreeMap::new();
        for version in collections.get(collection).into_iter().flatten().filter_map(schema_version_of) {
            *distribution.entry(version).or_insert(0) += 1;
        }
        Ok(distribution)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
