use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database};
use tracing::{debug, warn};

use super::constant::{DOCUMENT_KEY_FIELD, SCHEMA_VERSION_FIELD};
use super::error::DatabaseError;
use super::filter::version_from_bson;
use super::{DocumentFilter, DocumentStore, UpdateResult};
use crate::types::params::database::DatabaseArgs;

/// MongoDB implementation of [`DocumentStore`]
pub struct MongoDbClient {
    database: Arc<Database>,
}

impl MongoDbClient {
    pub async fn new(config: &DatabaseArgs) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&config.connection_uri).await?;
        let database = Arc::new(client.database(&config.database_name));
        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    async fn aggregate(&self, collection: &str, pipeline: Vec<Document>) -> Result<Vec<Document>, DatabaseError> {
        let cursor = self.collection(collection).aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Pipeline stage keeping only documents whose schema version is null, missing, or
/// an integral number in `0..=u32::MAX`
fn readable_version_stage() -> Document {
    let field = format!("${}", SCHEMA_VERSION_FIELD);
    let max_version = i64::from(u32::MAX);
    doc! {
        "$match": {
            "$or": [
                { SCHEMA_VERSION_FIELD: { "$type": ["int", "long"], "$gte": 0_i32, "$lte": max_version } },
                { SCHEMA_VERSION_FIELD: Bson::Null },
                { "$expr": { "$and": [
                    { "$eq": [{ "$type": field.clone() }, "double"] },
                    { "$eq": [{ "$trunc": field.clone() }, field.clone()] },
                    { "$gte": [field.clone(), 0_i32] },
                    { "$lte": [field, max_version] }
                ] } }
            ]
        }
    }
}

/// Matches the document by stable key, only while it is still at `expected_version`
fn guarded_key_filter(key: &Bson, expected_version: u32) -> Document {
    let mut filter = DocumentFilter::SchemaVersion(expected_version).to_mongo_filter();
    filter.insert(DOCUMENT_KEY_FIELD, key.clone());
    filter
}

fn missing_version_as_one() -> Document {
    doc! { "$ifNull": [format!("${}", SCHEMA_VERSION_FIELD), 1_i32] }
}

#[async_trait]
impl DocumentStore for MongoDbClient {
    async fn min_schema_version(&self, collection: &str) -> Result<Option<u32>, DatabaseError> {
        let pipeline = vec![
            readable_version_stage(),
            doc! { "$group": { "_id": Bson::Null, "min": { "$min": missing_version_as_one() } } },
        ];
        let results = self.aggregate(collection, pipeline).await?;

        let Some(row) = results.first() else {
            debug!(collection = %collection, "No versioned documents found");
            return Ok(None);
        };
        match row.get("min") {
            Some(value) => version_from_bson(value).map(Some).ok_or_else(|| DatabaseError::UnexpectedValue {
                collection: collection.to_string(),
                field: SCHEMA_VERSION_FIELD.to_string(),
                value: value.to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn find(&self, collection: &str, filter: DocumentFilter) -> Result<Vec<Document>, DatabaseError> {
        let cursor = self.collection(collection).find(filter.to_mongo_filter(), None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_one(
        &self,
        collection: &str,
        key: &Bson,
        expected_version: u32,
        patch: Document,
    ) -> Result<UpdateResult, DatabaseError> {
        let filter = guarded_key_filter(key, expected_version);
        let update = doc! { "$set": patch };
        let result = self.collection(collection).update_one(filter, update, None).await?;
        Ok(UpdateResult { matched_count: result.matched_count, modified_count: result.modified_count })
    }

    async fn count(&self, collection: &str, filter: DocumentFilter) -> Result<u64, DatabaseError> {
        Ok(self.collection(collection).count_documents(filter.to_mongo_filter(), None).await?)
    }

    async fn version_distribution(&self, collection: &str) -> Result<BTreeMap<u32, u64>, DatabaseError> {
        let pipeline = vec![
            readable_version_stage(),
            doc! { "$group": { "_id": missing_version_as_one(), "count": { "$sum": 1_i32 } } },
        ];
        let rows = self.aggregate(collection, pipeline).await?;

        let mut distribution = BTreeMap::new();
        for row in rows {
            let version = row.get("_id").and_then(version_from_bson);
            let count = match row.get("count") {
                Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or_default(),
                Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or_default(),
                _ => 0,
            };
            match version {
                Some(version) => *distribution.entry(version).or_insert(0) += count,
                None => warn!(collection = %collection, row = %row, "Skipping unreadable schema version group"),
            }
        }
        Ok(distribution)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
