use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::schema::{RegistryError, UpgradeError};

/// Result type for storefront operations
pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Error types for the storefront service
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Database error: {0}")]
    DatabaseCoreError(#[from] DatabaseError),

    #[error("Schema registry error: {0}")]
    RegistryError(#[from] RegistryError),

    #[error("Schema upgrade error: {0}")]
    UpgradeError(#[from] UpgradeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storefront Error: {0}")]
    StorefrontAnyHowError(#[from] anyhow::Error),

    /// Raised by `migrate --fail-on-errors`
    #[error("Schema upgrade finished with {0} error(s)")]
    UpgradeFailed(usize),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
