use mongodb::bson::{doc, Bson, Document};

use super::constant::SCHEMA_VERSION_FIELD;

/// Typed document selector understood by every [`DocumentStore`](super::DocumentStore).
///
/// Store implementations translate it into their own query language, so the
/// upgrade engine never builds raw queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFilter {
    /// Every document of the collection.
    All,
    /// Documents at exactly this schema version. Version 1 also matches
    /// documents where the field is missing or null.
    SchemaVersion(u32),
}

impl DocumentFilter {
    /// Evaluates the filter against a single document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::SchemaVersion(version) => schema_version_of(document) == Some(*version),
        }
    }

    /// MongoDB query equivalent of this filter.
    pub fn to_mongo_filter(&self) -> Document {
        match self {
            DocumentFilter::All => doc! {},
            // `$in` with null also matches documents where the field is absent
            DocumentFilter::SchemaVersion(1) => doc! { SCHEMA_VERSION_FIELD: { "$in": [1_i32, Bson::Null] } },
            DocumentFilter::SchemaVersion(version) => doc! { SCHEMA_VERSION_FIELD: version_to_bson(*version) },
        }
    }
}

/// Reads a schema version out of a BSON value.
///
/// Integral numbers of any BSON numeric type are accepted; anything else is
/// not a readable version.
pub fn version_from_bson(value: &Bson) -> Option<u32> {
    match value {
        Bson::Int32(v) => u32::try_from(*v).ok(),
        Bson::Int64(v) => u32::try_from(*v).ok(),
        Bson::Double(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX) => Some(*v as u32),
        _ => None,
    }
}

/// Schema version of a stored document, `1` when the field is missing or null.
///
/// Returns `None` for a version of an unreadable type; such documents are
/// never eligible for an upgrade step.
pub fn schema_version_of(document: &Document) -> Option<u32> {
    match document.get(SCHEMA_VERSION_FIELD) {
        None | Some(Bson::Null) => Some(1),
        Some(value) => version_from_bson(value),
    }
}

pub fn version_to_bson(version: u32) -> Bson {
    match i32::try_from(version) {
        Ok(v) => Bson::Int32(v),
        Err(_) => Bson::Int64(i64::from(version)),
    }
}
