use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::error::UpgradeError;

/// What happened to a (collection, version) pair during a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepOutcome {
    /// A registered step ran against the eligible documents.
    Applied,
    /// No step is registered for this version bump; documents were left untouched.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeStepResult {
    pub collection: String,
    pub from_version: u32,
    pub to_version: u32,
    pub outcome: StepOutcome,
    pub documents_processed: u64,
    pub documents_upgraded: u64,
    /// Documents another writer advanced between selection and write-back.
    #[serde(default)]
    pub documents_skipped: u64,
    pub errors: Vec<String>,
    /// Set when cancellation stopped the step before every selected document was processed.
    #[serde(default)]
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl UpgradeStepResult {
    pub fn new(collection: &str, from_version: u32, to_version: u32) -> Self {
        let now = Utc::now();
        Self {
            collection: collection.to_string(),
            from_version,
            to_version,
            outcome: StepOutcome::Applied,
            documents_processed: 0,
            documents_upgraded: 0,
            documents_skipped: 0,
            errors: Vec::new(),
            interrupted: false,
            started_at: now,
            completed_at: now,
        }
    }

    /// No-op result for a version bump without a registered step.
    pub fn absent(collection: &str, from_version: u32, to_version: u32) -> Self {
        Self { outcome: StepOutcome::Absent, ..Self::new(collection, from_version, to_version) }
    }

    pub fn describe(&self) -> String {
        match self.outcome {
            StepOutcome::Applied => format!(
                "{}: v{} -> v{} ({}/{} upgraded)",
                self.collection, self.from_version, self.to_version, self.documents_upgraded, self.documents_processed
            ),
            StepOutcome::Absent => {
                format!("{}: v{} -> v{} (no step registered)", self.collection, self.from_version, self.to_version)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUpgradeResult {
    pub collection: String,
    pub target_version: u32,
    /// Lowest schema version found when the cascade started, `None` for an empty collection.
    pub starting_version: Option<u32>,
    pub documents_upgraded: u64,
    pub step_results: Vec<UpgradeStepResult>,
    pub errors: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl CollectionUpgradeResult {
    pub fn new(collection: &str, target_version: u32) -> Self {
        Self {
            collection: collection.to_string(),
            target_version,
            starting_version: None,
            documents_upgraded: 0,
            step_results: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        }
    }

    pub fn record_step(&mut self, step: UpgradeStepResult) {
        self.documents_upgraded += step.documents_upgraded;
        self.errors.extend(step.errors.iter().cloned());
        self.cancelled |= step.interrupted;
        self.step_results.push(step);
    }

    pub fn record_error(&mut self, error: &UpgradeError) {
        self.errors.push(error.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRunResult {
    pub collections_upgraded: Vec<String>,
    pub total_documents_upgraded: u64,
    pub step_descriptions: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl UpgradeRunResult {
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            collections_upgraded: Vec::new(),
            total_documents_upgraded: 0,
            step_descriptions: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
            started_at: now,
            completed_at: now,
        }
    }

    /// Folds one collection's outcome into the run totals.
    pub fn absorb(&mut self, collection: &CollectionUpgradeResult) {
        if collection.documents_upgraded > 0 {
            self.collections_upgraded.push(collection.collection.clone());
        }
        self.total_documents_upgraded += collection.documents_upgraded;
        self.step_descriptions.extend(collection.step_results.iter().map(UpgradeStepResult::describe));
        self.errors.extend(collection.errors.iter().cloned());
        self.cancelled |= collection.cancelled;
    }

    pub fn record_error(&mut self, error: &UpgradeError) {
        self.errors.push(error.to_string());
    }

    pub fn finish(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }

    /// `true` when the run completed without any recorded error or cancellation.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }
}

/// Read-only view of one collection's schema state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchemaStatus {
    pub current_target_version: u32,
    pub total_documents: u64,
    pub min_version: Option<u32>,
    pub version_distribution: BTreeMap<u32, u64>,
    pub needs_migration: bool,
}

pub type SchemaStatusReport = BTreeMap<String, CollectionSchemaStatus>;
