/// Field carrying the schema revision of a stored document.
///
/// A document without this field is treated as revision 1.
pub const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Stable application key used to address a document on write-back.
///
/// This is distinct from MongoDB's `_id`, which is storage-internal.
pub const DOCUMENT_KEY_FIELD: &str = "id";

/// Storage-internal identifier, only used to describe documents that lack a stable key.
pub const INTERNAL_ID_FIELD: &str = "_id";

pub const USERS_COLLECTION: &str = "users";
pub const CARTS_COLLECTION: &str = "carts";
pub const WISHLISTS_COLLECTION: &str = "wishlists";
pub const TOKENS_COLLECTION: &str = "tokens";
pub const PRODUCTS_COLLECTION: &str = "products";

/// Collection name for contact-form tickets
///
/// Tickets are raised by customers through the contact form and annotated by
/// administrators with `adminNotes`.
pub const CONTACTS_COLLECTION: &str = "contacts";
