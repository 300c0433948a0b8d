//! Document schema revisions.
//!
//! Files: `<collection>_XXXX.rs` where XXXX is the version produced by the step
//! (e.g., `contacts_0002.rs` = contacts v1→v2).
//!
//! To add a new revision:
//! 1. Create `<collection>_XXXX.rs` with a type implementing [`UpgradeStep`]
//! 2. Export module here
//! 3. Register it in [`default_steps`]
//! 4. Bump the collection's target in [`super::registry::DEFAULT_TARGETS`]
//!
//! A version bump that needs no document change gets no file: the cascade
//! records it as an absent step.

pub mod contacts_0002;
pub mod contacts_0003;
pub mod products_0002;

use std::sync::Arc;

use super::step::UpgradeStep;

/// Every upgrade step compiled into this build.
pub fn default_steps() -> Vec<Arc<dyn UpgradeStep>> {
    vec![
        Arc::new(contacts_0002::ContactsAdminNotes),
        Arc::new(contacts_0003::ContactsAssignedAdmin),
        Arc::new(products_0002::ProductsNumericFields),
    ]
}
