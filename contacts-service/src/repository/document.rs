use super::object_id::format_contact_id;
use mongodb::bson::{Bson, Document};

/// Field under which callers see the identifier.
pub const ID_FIELD: &str = "id";

/// Field under which MongoDB stores the native key.
pub const NATIVE_ID_FIELD: &str = "_id";

/// Rename `_id` to a string `id`, replacing any `id` attribute already present.
pub fn normalize(mut document: Document) -> Document {
    if let Some(native) = document.remove(NATIVE_ID_FIELD) {
        let id = match native {
            Bson::ObjectId(oid) => format_contact_id(&oid),
            Bson::String(s) => s,
            other => other.to_string(),
        };
        document.insert(ID_FIELD, id);
    }
    document
}

/// Drop identifier fields from caller-supplied attributes.
pub fn strip_identifiers(document: &mut Document) {
    document.remove(NATIVE_ID_FIELD);
    document.remove(ID_FIELD);
}
