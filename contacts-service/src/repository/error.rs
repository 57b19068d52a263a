use service_core::error::AppError;
use std::time::Duration;
use thiserror::Error;

/// How long callers are told to wait before retrying after an outage.
pub const RETRY_AFTER: Duration = Duration::from_secs(30);

/// Caller-facing outcome of a failed repository operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactsError {
    /// The identifier is not a valid `ObjectId` string.
    #[error("Invalid contact id: {id}")]
    InvalidId { id: String, reason: String },

    #[error("Contact {id} not found")]
    NotFound { id: String },

    /// Any connectivity, timeout or failover problem talking to the datastore.
    #[error("Datastore at {endpoint} is unreachable")]
    Unavailable {
        endpoint: String,
        retry_after: Duration,
    },
}

impl ContactsError {
    pub fn unavailable(endpoint: impl Into<String>) -> Self {
        ContactsError::Unavailable {
            endpoint: endpoint.into(),
            retry_after: RETRY_AFTER,
        }
    }
}

impl From<ContactsError> for AppError {
    fn from(err: ContactsError) -> Self {
        match err {
            ContactsError::InvalidId { id, reason } => AppError::BadRequest(anyhow::anyhow!(
                "Invalid contact id: {}: {}",
                id,
                reason
            )),
            ContactsError::NotFound { id } => {
                AppError::NotFound(anyhow::anyhow!("Contact {} not found", id))
            }
            ContactsError::Unavailable {
                endpoint,
                retry_after,
            } => AppError::ServiceUnavailable(
                format!(
                    "MongoDB at {} failed to respond. This is transient, future attempts \
                     will work when the datastore returns to service",
                    endpoint
                ),
                Some(retry_after.as_secs()),
            ),
        }
    }
}
