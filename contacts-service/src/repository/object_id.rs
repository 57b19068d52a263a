//! Conversion between external contact identifiers and MongoDB `ObjectId`s.

use super::error::ContactsError;
use mongodb::bson::oid::ObjectId;

/// Parse an external identifier into the native key.
///
/// Every rejection, whatever the underlying parse failure, is reported as
/// [`ContactsError::InvalidId`] carrying the offending input.
pub fn parse_contact_id(id: &str) -> Result<ObjectId, ContactsError> {
    ObjectId::parse_str(id).map_err(|e| ContactsError::InvalidId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// The external form of a native key: 24 lowercase hex characters.
pub fn format_contact_id(id: &ObjectId) -> String {
    id.to_hex()
}
