//! Schema version upgrade engine.
//!
//! Stored documents carry a `schemaVersion` tag (missing means 1). The
//! [`VersionRegistry`] states the version the current code expects for every
//! collection, and the [`StepLocator`] knows which [`UpgradeStep`] moves a
//! collection from one version to the next. [`CollectionUpgrader`] walks a
//! single collection up to its target and [`UpgradeOrchestrator`] does so for
//! every registered collection.
//!
//! Failures never surface as `Err` from a run: they are reported in the
//! `errors` lists of the returned results and the caller decides whether they
//! are fatal.

pub mod coerce;
pub mod collection;
pub mod error;
pub mod locator;
pub mod registry;
pub mod revisions;
pub mod runner;
pub mod step;
pub mod types;

pub use collection::CollectionUpgrader;
pub use error::{RegistryError, TransformError, UpgradeError};
pub use locator::StepLocator;
pub use registry::{VersionRegistry, VersionRegistryEntry};
pub use runner::{UpgradeOrchestrator, DEFAULT_MAX_CONCURRENCY};
pub use step::{StepContext, UpgradeStep};
pub use types::{
    CollectionSchemaStatus, CollectionUpgradeResult, SchemaStatusReport, StepOutcome, UpgradeRunResult,
    UpgradeStepResult,
};
