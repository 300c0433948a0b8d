pub mod database;

pub use database::memory::InMemoryDocumentStore;
pub use database::mongodb::MongoDbClient;
pub use database::{DatabaseError, DocumentFilter, DocumentStore};
