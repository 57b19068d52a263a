//! json:api style response shapes.

use crate::repository::ID_FIELD;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

pub const CONTACTS_TYPE: &str = "contacts";

/// A single resource object: `{"type": ..., "id": ..., "attributes": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Resource<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: A,
}

impl<A> Resource<A> {
    pub fn new(kind: &'static str, id: impl Into<String>, attributes: A) -> Self {
        Self {
            kind,
            id: id.into(),
            attributes,
        }
    }
}

/// Top-level `{"data": ...}` wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Wrap a normalized contact document. The `id` moves to the resource level;
/// every other field becomes an attribute, rendered as relaxed extended JSON.
pub fn contact_resource(mut document: Document) -> Resource<Map<String, Value>> {
    let id = match document.remove(ID_FIELD) {
        Some(Bson::String(id)) => id,
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let attributes = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Resource::new(CONTACTS_TYPE, id, attributes)
}
