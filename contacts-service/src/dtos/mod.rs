pub mod health;
pub mod json_api;

pub use health::{LivenessAttributes, ReadinessAttributes, HEALTH_RESOURCE_ID};
pub use json_api::{contact_resource, DataEnvelope, Resource, CONTACTS_TYPE};
