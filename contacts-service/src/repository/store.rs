use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use thiserror::Error;

/// Failure reported by a [`ContactStore`].
///
/// The repository turns both variants into the same caller-facing fault; the
/// split only decides how loudly the failure is logged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Datastore connectivity failure: {0}")]
    Connectivity(#[source] anyhow::Error),

    #[error("Datastore failure: {0}")]
    Other(#[source] anyhow::Error),
}

/// Raw document access for the contacts collection.
///
/// Documents are passed through untouched, keyed by `_id`. Implementations
/// must be safe to share between concurrent requests.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Where the store lives, for diagnostics. Never contains credentials.
    fn endpoint(&self) -> &str;

    /// Insert a document that already carries its `_id`.
    async fn insert(&self, document: Document) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError>;

    /// Any single document, in natural order.
    async fn find_first(&self) -> Result<Option<Document>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    /// Set the given top-level fields, returning the document after the update.
    ///
    /// Keys are literal field names. Callers must not pass `$`-prefixed or
    /// dotted keys; MongoDB would interpret those as operators or paths.
    async fn update_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Replace every field except `_id`, returning the document after the replace.
    async fn replace(
        &self,
        id: ObjectId,
        document: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, id: ObjectId) -> Result<(), StoreError>;

    /// Administrative round trip that touches no data.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections. Called once, on process shutdown.
    async fn shutdown(&self) {}
}
