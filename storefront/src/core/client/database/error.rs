use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Unexpected value for '{field}' in collection '{collection}': {value}")]
    UnexpectedValue { collection: String, field: String, value: String },

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}
