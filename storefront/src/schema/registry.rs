use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::RegistryError;
use crate::core::client::database::constant::{
    CARTS_COLLECTION, CONTACTS_COLLECTION, PRODUCTS_COLLECTION, TOKENS_COLLECTION, USERS_COLLECTION,
    WISHLISTS_COLLECTION,
};

/// Version every collection is assumed to be at when it is not registered.
pub const DEFAULT_TARGET_VERSION: u32 = 1;

/// Target schema versions compiled into this build.
///
/// Bump an entry together with adding the matching revision under
/// [`super::revisions`]. Targets must never decrease.
pub const DEFAULT_TARGETS: &[(&str, u32)] = &[
    (USERS_COLLECTION, 1),
    (CARTS_COLLECTION, 1),
    (WISHLISTS_COLLECTION, 1),
    (TOKENS_COLLECTION, 1),
    (PRODUCTS_COLLECTION, 2),
    (CONTACTS_COLLECTION, 3),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRegistryEntry {
    pub collection_name: String,
    pub target_version: u32,
}

/// Lookup table from collection name to the schema version the current code expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRegistry {
    targets: BTreeMap<String, u32>,
}

impl VersionRegistry {
    pub fn new<I, S>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self::default().with_overrides(entries)
    }

    /// Registry built from [`DEFAULT_TARGETS`].
    pub fn with_defaults() -> Self {
        let targets = DEFAULT_TARGETS.iter().map(|(name, version)| (name.to_string(), *version)).collect();
        Self { targets }
    }

    /// Adds or replaces targets, rejecting versions below 1.
    pub fn with_overrides<I, S>(mut self, entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        for (name, version) in entries {
            let name = name.into();
            if version < DEFAULT_TARGET_VERSION {
                return Err(RegistryError::InvalidTargetVersion { collection: name });
            }
            self.targets.insert(name, version);
        }
        Ok(self)
    }

    /// Target version for a collection; unregistered names have nothing to upgrade.
    pub fn target_version(&self, collection: &str) -> u32 {
        self.targets.get(collection).copied().unwrap_or(DEFAULT_TARGET_VERSION)
    }

    pub fn all_entries(&self) -> Vec<VersionRegistryEntry> {
        self.targets
            .iter()
            .map(|(name, version)| VersionRegistryEntry { collection_name: name.clone(), target_version: *version })
            .collect()
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.targets.contains_key(collection)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
