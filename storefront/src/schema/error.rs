use thiserror::Error;

use crate::core::client::database::DatabaseError;

/// Failures recorded while upgrading stored documents.
///
/// None of these abort a run: they are rendered into the `errors` lists of the
/// step, collection and run results.
#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("Document {key} in '{collection}' could not be upgraded to v{to_version}: {reason}")]
    DocumentTransform { collection: String, key: String, to_version: u32, reason: String },

    #[error("Collection '{collection}' could not be accessed: {source}")]
    CollectionAccess {
        collection: String,
        #[source]
        source: DatabaseError,
    },

    #[error("Upgrade task for collection '{collection}' did not complete: {reason}")]
    TaskAborted { collection: String, reason: String },
}

/// Reasons a single document could not be transformed by an upgrade step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Field '{field}' has unexpected type: expected {expected}, found {found}")]
    UnexpectedType { field: String, expected: &'static str, found: String },

    #[error("Document has no stable key field '{field}'")]
    MissingKey { field: &'static str },
}

/// Inconsistencies in the version registry or the step table, detected at start-up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Target version for collection '{collection}' must be at least 1")]
    InvalidTargetVersion { collection: String },

    #[error("Duplicate upgrade step registered for '{collection}' v{to_version}")]
    DuplicateStep { collection: String, to_version: u32 },

    #[error("Upgrade step for '{collection}' targets v{to_version}; steps must target v2 or above")]
    InvalidStepVersion { collection: String, to_version: u32 },

    #[error("Upgrade step for '{collection}' targets v{to_version}, beyond the registered target v{target_version}")]
    StepBeyondTarget { collection: String, to_version: u32, target_version: u32 },
}
