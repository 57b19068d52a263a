pub mod contacts;
pub mod health;
pub mod metrics;

pub use contacts::{
    create_contact, delete_contact, get_contact, list_contacts, replace_contact, update_contact,
};
pub use health::{liveness, ping, readiness};
pub use metrics::metrics_endpoint;
