//! contacts v2→v3: contacts gain an assigned administrator, unassigned by default.

use mongodb::bson::{doc, Bson, Document};

use crate::core::client::database::constant::CONTACTS_COLLECTION;
use crate::schema::error::TransformError;
use crate::schema::step::{StepContext, UpgradeStep};

pub const ASSIGNED_ADMIN_FIELD: &str = "adminId";

pub struct ContactsAssignedAdmin;

impl UpgradeStep for ContactsAssignedAdmin {
    fn collection(&self) -> &'static str {
        CONTACTS_COLLECTION
    }

    fn to_version(&self) -> u32 {
        3
    }

    fn description(&self) -> &'static str {
        "add assigned administrator"
    }

    fn patch(&self, document: &Document, _ctx: &StepContext) -> Result<Document, TransformError> {
        if document.contains_key(ASSIGNED_ADMIN_FIELD) {
            return Ok(Document::new());
        }
        Ok(doc! { ASSIGNED_ADMIN_FIELD: Bson::Null })
    }
}
