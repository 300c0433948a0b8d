use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::RegistryError;
use super::registry::VersionRegistry;
use super::step::UpgradeStep;

/// Static table resolving the step that brings a collection to a given version.
///
/// The table is filled explicitly at start-up (see [`super::revisions::default_steps`]),
/// so the full step inventory is visible in one place.
#[derive(Clone, Default)]
pub struct StepLocator {
    steps: HashMap<(String, u32), Arc<dyn UpgradeStep>>,
}

impl StepLocator {
    pub fn new<I>(steps: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn UpgradeStep>>,
    {
        let mut locator = Self::default();
        for step in steps {
            locator.register(step)?;
        }
        Ok(locator)
    }

    pub fn register(&mut self, step: Arc<dyn UpgradeStep>) -> Result<(), RegistryError> {
        let collection = step.collection().to_string();
        let to_version = step.to_version();

        if to_version < 2 {
            return Err(RegistryError::InvalidStepVersion { collection, to_version });
        }
        if self.steps.contains_key(&(collection.clone(), to_version)) {
            return Err(RegistryError::DuplicateStep { collection, to_version });
        }
        self.steps.insert((collection, to_version), step);
        Ok(())
    }

    /// Step producing `to_version` documents for `collection`.
    ///
    /// `None` means the version bump needs no structural change.
    pub fn resolve(&self, collection: &str, to_version: u32) -> Option<Arc<dyn UpgradeStep>> {
        self.steps.get(&(collection.to_string(), to_version)).cloned()
    }

    /// Registered `(collection, to_version)` pairs in ascending order.
    pub fn inventory(&self) -> Vec<(String, u32)> {
        let mut keys: Vec<_> = self.steps.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Rejects steps that would carry documents past their collection's registered target.
    pub fn validate_against(&self, registry: &VersionRegistry) -> Result<(), RegistryError> {
        for (collection, to_version) in self.inventory() {
            let target_version = registry.target_version(&collection);
            if to_version > target_version {
                return Err(RegistryError::StepBeyondTarget { collection, to_version, target_version });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for StepLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepLocator").field("steps", &self.inventory()).finish()
    }
}
