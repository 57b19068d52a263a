//! All operations on the contacts collection.
//!
//! [`ContactsRepository`] is the only way handlers reach the datastore. It
//! converts external identifiers, normalizes every document it returns
//! (`_id` becomes a string `id`) and reports failures as [`ContactsError`].

pub mod document;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod object_id;
pub mod store;

pub use document::{normalize, strip_identifiers, ID_FIELD, NATIVE_ID_FIELD};
pub use error::{ContactsError, RETRY_AFTER};
pub use memory::InMemoryContactStore;
pub use mongo::MongoContactStore;
pub use object_id::{format_contact_id, parse_contact_id};
pub use store::{ContactStore, StoreError};

use metrics::{counter, histogram};
use mongodb::bson::{oid::ObjectId, Document};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ContactsRepository {
    store: Arc<dyn ContactStore>,
}

impl ContactsRepository {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    pub fn endpoint(&self) -> &str {
        self.store.endpoint()
    }

    pub fn store(&self) -> &Arc<dyn ContactStore> {
        &self.store
    }

    /// Store a new contact under a freshly generated id.
    ///
    /// A single store call: once the insert succeeds the contact is returned
    /// as written, so a successful write is never reported as a fault.
    pub async fn create(&self, mut attributes: Document) -> Result<Document, ContactsError> {
        strip_identifiers(&mut attributes);
        let oid = ObjectId::new();
        let mut document = Document::new();
        document.insert(NATIVE_ID_FIELD, oid);
        for (key, value) in attributes {
            document.insert(key, value);
        }

        self.call("create", self.store.insert(document.clone())).await?;
        tracing::info!(contact_id = %oid, "Created contact");

        Ok(normalize(document))
    }

    pub async fn get(&self, id: &str) -> Result<Document, ContactsError> {
        let oid = parse_contact_id(id)?;
        self.call("get", self.store.find_by_id(oid))
            .await?
            .map(normalize)
            .ok_or_else(|| not_found(id))
    }

    /// Every contact, in the datastore's natural order.
    pub async fn list(&self) -> Result<Vec<Document>, ContactsError> {
        tracing::info!("Fetching all contacts from datastore");
        let documents = self.call("list", self.store.find_all()).await?;
        Ok(documents.into_iter().map(normalize).collect())
    }

    /// Set only the supplied attributes; everything else is kept.
    pub async fn update(
        &self,
        id: &str,
        mut attributes: Document,
    ) -> Result<Document, ContactsError> {
        let oid = parse_contact_id(id)?;
        strip_identifiers(&mut attributes);
        if attributes.is_empty() {
            // MongoDB rejects an empty $set
            return self.get(id).await;
        }

        self.call("update", self.store.update_fields(oid, attributes))
            .await?
            .map(normalize)
            .ok_or_else(|| not_found(id))
    }

    /// Swap all attributes for the supplied set, keeping the id.
    pub async fn replace(
        &self,
        id: &str,
        mut attributes: Document,
    ) -> Result<Document, ContactsError> {
        let oid = parse_contact_id(id)?;
        strip_identifiers(&mut attributes);

        self.call("replace", self.store.replace(oid, attributes))
            .await?
            .map(normalize)
            .ok_or_else(|| not_found(id))
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), ContactsError> {
        let oid = parse_contact_id(id)?;
        self.call("delete", self.store.delete(oid)).await?;
        tracing::info!(contact_id = %oid, "Deleted contact");
        Ok(())
    }

    /// Any one contact, or `None` when the collection is empty.
    pub async fn find_one(&self) -> Result<Option<Document>, ContactsError> {
        Ok(self
            .call("find_one", self.store.find_first())
            .await?
            .map(normalize))
    }

    /// Lightweight connectivity check.
    pub async fn ping(&self) -> Result<(), ContactsError> {
        self.call("ping", self.store.ping()).await
    }

    /// Run one store call, recording its latency and collapsing any failure
    /// into [`ContactsError::Unavailable`].
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ContactsError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let start = Instant::now();
        let result = fut.await;
        histogram!("contacts_datastore_duration_seconds", "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(value) => {
                counter!(
                    "contacts_datastore_operations_total",
                    "operation" => operation,
                    "outcome" => "ok"
                )
                .increment(1);
                Ok(value)
            }
            Err(err) => {
                counter!(
                    "contacts_datastore_operations_total",
                    "operation" => operation,
                    "outcome" => "unavailable"
                )
                .increment(1);
                match &err {
                    StoreError::Connectivity(_) => tracing::warn!(
                        operation,
                        endpoint = %self.endpoint(),
                        error = %err,
                        "Datastore unreachable"
                    ),
                    StoreError::Other(_) => tracing::error!(
                        operation,
                        endpoint = %self.endpoint(),
                        error = %err,
                        "Unclassified datastore failure"
                    ),
                }
                Err(ContactsError::unavailable(self.endpoint()))
            }
        }
    }
}

fn not_found(id: &str) -> ContactsError {
    ContactsError::NotFound { id: id.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Bson};
    use std::time::Duration;

    fn repository() -> (ContactsRepository, Arc<InMemoryContactStore>) {
        let store = Arc::new(InMemoryContactStore::new("memory://test"));
        (ContactsRepository::new(store.clone()), store)
    }

    fn id_of(document: &Document) -> String {
        document.get_str(ID_FIELD).unwrap().to_string()
    }

    #[tokio::test]
    async fn create_then_get_returns_same_document() {
        let (repo, _) = repository();
        let created = repo
            .create(doc! { "firstName": "Leroy", "lastName": "Jenkins" })
            .await
            .unwrap();

        let id = id_of(&created);
        assert!(parse_contact_id(&id).is_ok());
        assert!(created.get(NATIVE_ID_FIELD).is_none());

        let fetched = repo.get(&id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.get_str("firstName").unwrap(), "Leroy");
    }

    #[tokio::test]
    async fn create_ignores_caller_supplied_ids() {
        let (repo, _) = repository();
        let created = repo
            .create(doc! { "id": "mine", "_id": 7, "firstName": "Leroy" })
            .await
            .unwrap();

        assert_ne!(id_of(&created), "mine");
        assert_eq!(created.keys().filter(|k| *k == ID_FIELD).count(), 1);
        assert!(created.get(NATIVE_ID_FIELD).is_none());
    }

    #[tokio::test]
    async fn update_merges_supplied_fields() {
        let (repo, _) = repository();
        let id = id_of(&repo.create(doc! { "a": 0, "b": 2 }).await.unwrap());

        let updated = repo.update(&id, doc! { "a": 1 }).await.unwrap();
        assert_eq!(updated, doc! { "a": 1, "b": 2, "id": id.clone() });
    }

    #[tokio::test]
    async fn update_with_no_fields_returns_current_document() {
        let (repo, _) = repository();
        let id = id_of(&repo.create(doc! { "a": 0 }).await.unwrap());

        let unchanged = repo.update(&id, doc! { "id": "ignored" }).await.unwrap();
        assert_eq!(unchanged, doc! { "a": 0, "id": id.clone() });
    }

    #[tokio::test]
    async fn replace_drops_unsupplied_fields() {
        let (repo, _) = repository();
        let id = id_of(&repo.create(doc! { "a": 0, "b": 2 }).await.unwrap());

        let replaced = repo.replace(&id, doc! { "a": 1 }).await.unwrap();
        assert_eq!(replaced, doc! { "a": 1, "id": id.clone() });
        assert_eq!(repo.get(&id).await.unwrap(), replaced);
    }

    #[tokio::test]
    async fn list_normalizes_every_document() {
        let (repo, _) = repository();
        repo.create(doc! { "n": 1 }).await.unwrap();
        repo.create(doc! { "n": 2 }).await.unwrap();

        let contacts = repo.list().await.unwrap();
        assert_eq!(contacts.len(), 2);
        for contact in &contacts {
            assert!(contact.get(NATIVE_ID_FIELD).is_none());
            assert!(matches!(contact.get(ID_FIELD), Some(Bson::String(_))));
        }
    }

    #[tokio::test]
    async fn missing_contact_is_not_found() {
        let (repo, _) = repository();
        let id = "5a41694752ec07986833d759";

        let expected = ContactsError::NotFound { id: id.to_string() };
        assert_eq!(repo.get(id).await.unwrap_err(), expected);
        assert_eq!(repo.update(id, doc! { "a": 1 }).await.unwrap_err(), expected);
        assert_eq!(repo.replace(id, doc! { "a": 1 }).await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn delete_of_missing_contact_succeeds() {
        let (repo, _) = repository();
        assert!(repo.delete("5a41694752ec07986833d759").await.is_ok());
    }

    #[tokio::test]
    async fn malformed_id_is_invalid_not_missing() {
        let (repo, _) = repository();
        for bad in ["123", "not-an-object-id-at-all!"] {
            assert!(matches!(
                repo.get(bad).await,
                Err(ContactsError::InvalidId { ref id, .. }) if id == bad
            ));
            assert!(matches!(
                repo.update(bad, doc! { "a": 1 }).await,
                Err(ContactsError::InvalidId { .. })
            ));
            assert!(matches!(
                repo.replace(bad, doc! { "a": 1 }).await,
                Err(ContactsError::InvalidId { .. })
            ));
            assert!(matches!(
                repo.delete(bad).await,
                Err(ContactsError::InvalidId { .. })
            ));
        }
    }

    #[tokio::test]
    async fn outage_is_unavailable_for_every_operation() {
        let (repo, store) = repository();
        let id = id_of(&repo.create(doc! { "a": 0 }).await.unwrap());
        store.set_available(false);

        let expected = ContactsError::Unavailable {
            endpoint: "memory://test".to_string(),
            retry_after: Duration::from_secs(30),
        };

        assert_eq!(repo.create(doc! { "a": 1 }).await.unwrap_err(), expected);
        assert_eq!(repo.get(&id).await.unwrap_err(), expected);
        assert_eq!(repo.list().await.unwrap_err(), expected);
        assert_eq!(repo.update(&id, doc! { "a": 1 }).await.unwrap_err(), expected);
        assert_eq!(repo.replace(&id, doc! { "a": 1 }).await.unwrap_err(), expected);
        assert_eq!(repo.delete(&id).await.unwrap_err(), expected);
        assert_eq!(repo.find_one().await.unwrap_err(), expected);
        assert_eq!(repo.ping().await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn find_one_on_empty_collection_is_none() {
        let (repo, _) = repository();
        assert_eq!(repo.find_one().await.unwrap(), None);

        repo.create(doc! { "a": 0 }).await.unwrap();
        let first = repo.find_one().await.unwrap().unwrap();
        assert!(first.get(NATIVE_ID_FIELD).is_none());
    }

    /// Accepts writes but every lookup by id fails.
    struct UnreadableStore {
        inner: InMemoryContactStore,
    }

    #[async_trait::async_trait]
    impl ContactStore for UnreadableStore {
        fn endpoint(&self) -> &str {
            self.inner.endpoint()
        }

        async fn insert(&self, document: Document) -> Result<(), StoreError> {
            self.inner.insert(document).await
        }

        async fn find_by_id(&self, _id: ObjectId) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Connectivity(anyhow::anyhow!("read timed out")))
        }

        async fn find_first(&self) -> Result<Option<Document>, StoreError> {
            self.inner.find_first().await
        }

        async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
            self.inner.find_all().await
        }

        async fn update_fields(
            &self,
            id: ObjectId,
            fields: Document,
        ) -> Result<Option<Document>, StoreError> {
            self.inner.update_fields(id, fields).await
        }

        async fn replace(
            &self,
            id: ObjectId,
            document: Document,
        ) -> Result<Option<Document>, StoreError> {
            self.inner.replace(id, document).await
        }

        async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn create_succeeds_once_insert_succeeds() {
        let store = Arc::new(UnreadableStore {
            inner: InMemoryContactStore::new("memory://unreadable"),
        });
        let repo = ContactsRepository::new(store.clone());

        let created = repo
            .create(doc! { "firstName": "Leroy" })
            .await
            .expect("a stored contact must not be reported as a fault");

        assert_eq!(created.get_str("firstName").unwrap(), "Leroy");
        assert_eq!(store.inner.len(), 1);

        let stored = store.inner.find_all().await.unwrap();
        assert_eq!(normalize(stored[0].clone()), created);
    }

    #[tokio::test]
    async fn leroy_jenkins_lifecycle() {
        let (repo, _) = repository();
        let created = repo
            .create(doc! { "firstName": "Leroy", "lastName": "Jenkins" })
            .await
            .unwrap();
        let id = id_of(&created);

        let fetched = repo.get(&id).await.unwrap();
        assert_eq!(fetched.get_str("firstName").unwrap(), "Leroy");
        assert_eq!(fetched.get_str("lastName").unwrap(), "Jenkins");
        assert_eq!(id_of(&fetched), id);

        repo.delete(&id).await.unwrap();
        assert_eq!(
            repo.get(&id).await.unwrap_err(),
            ContactsError::NotFound { id: id.clone() }
        );
    }
}
