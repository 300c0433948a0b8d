pub mod constant;
pub mod error;
pub mod filter;
pub mod memory;
pub mod mongodb;

use std::collections::BTreeMap;

use ::mongodb::bson::{Bson, Document};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::DatabaseError;
pub use filter::DocumentFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Trait defining the document store operations the schema upgrade engine relies on.
///
/// Any document store able to answer these queries can host the engine. Keys
/// passed to [`DocumentStore::update_one`] are values of the stable key field
/// ([`constant::DOCUMENT_KEY_FIELD`]), never storage-internal identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// min_schema_version - Lowest schema version present in a collection
    ///
    /// Documents without a schema version count as version 1. Returns `None`
    /// when the collection holds no document with a readable version.
    async fn min_schema_version(&self, collection: &str) -> Result<Option<u32>, DatabaseError>;

    /// find - Fetch every document of a collection matching the filter
    async fn find(&self, collection: &str, filter: DocumentFilter) -> Result<Vec<Document>, DatabaseError>;

    /// update_one - Apply a `$set` style patch to the document addressed by `key`
    ///
    /// The write only matches while the stored document is still at `expected_version`
    /// (version 1 also matching a missing or null field). A `matched_count` of 0 means
    /// the document was advanced or removed since it was read.
    async fn update_one(
        &self,
        collection: &str,
        key: &Bson,
        expected_version: u32,
        patch: Document,
    ) -> Result<UpdateResult, DatabaseError>;

    /// count - Count documents of a collection matching the filter
    async fn count(&self, collection: &str, filter: DocumentFilter) -> Result<u64, DatabaseError>;

    /// version_distribution - Number of documents per schema version
    ///
    /// Documents without a schema version are counted under version 1.
    async fn version_distribution(&self, collection: &str) -> Result<BTreeMap<u32, u64>, DatabaseError>;

    /// health_check - Ping the underlying store
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
