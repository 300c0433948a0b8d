//! contacts v1→v2: admin notes become structured records.
//!
//! Free-text notes are attributed to the bootstrap administrator and stamped
//! with the cascade's start time. Contacts without a status are opened as `new`.

use mongodb::bson::{doc, Bson, Document};

use crate::core::client::database::constant::CONTACTS_COLLECTION;
use crate::schema::error::TransformError;
use crate::schema::step::{StepContext, UpgradeStep};

pub const ADMIN_NOTES_FIELD: &str = "adminNotes";
pub const STATUS_FIELD: &str = "status";
pub const DEFAULT_STATUS: &str = "new";
/// Author assigned to notes written before notes were attributed.
pub const DEFAULT_ADMIN_ID: i32 = 1;

pub struct ContactsAdminNotes;

impl UpgradeStep for ContactsAdminNotes {
    fn collection(&self) -> &'static str {
        CONTACTS_COLLECTION
    }

    fn to_version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "structure admin notes, default contact status"
    }

    fn patch(&self, document: &Document, ctx: &StepContext) -> Result<Document, TransformError> {
        let notes = match document.get(ADMIN_NOTES_FIELD) {
            None | Some(Bson::Null) => Vec::new(),
            Some(Bson::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| structure_note(entry, ctx).map_err(|found| unexpected(index, found)))
                .collect::<Result<Vec<_>, _>>()?,
            Some(Bson::String(text)) => vec![note_record(text, ctx)],
            Some(other) => {
                return Err(TransformError::UnexpectedType {
                    field: ADMIN_NOTES_FIELD.to_string(),
                    expected: "array",
                    found: format!("{:?}", other.element_type()),
                })
            }
        };

        let mut patch = doc! { ADMIN_NOTES_FIELD: notes };
        if matches!(document.get(STATUS_FIELD), None | Some(Bson::Null)) {
            patch.insert(STATUS_FIELD, DEFAULT_STATUS);
        }
        Ok(patch)
    }
}

fn structure_note(entry: &Bson, ctx: &StepContext) -> Result<Bson, String> {
    match entry {
        Bson::String(text) => Ok(note_record(text, ctx)),
        Bson::Document(_) => Ok(entry.clone()),
        other => Err(format!("{:?}", other.element_type())),
    }
}

fn note_record(text: &str, ctx: &StepContext) -> Bson {
    Bson::Document(doc! { "adminId": DEFAULT_ADMIN_ID, "note": text, "createdAt": ctx.timestamp() })
}

fn unexpected(index: usize, found: String) -> TransformError {
    TransformError::UnexpectedType {
        field: format!("{}[{}]", ADMIN_NOTES_FIELD, index),
        expected: "string or document",
        found,
    }
}
